/// Japan Standard Time, used when nothing else is configured.
pub const DEFAULT_UTC_OFFSET: &str = "+09:00";

pub const CONFIG_FILE_NAME: &str = "config.yml";

pub fn app_dirs() -> Result<impl etcetera::AppStrategy, etcetera::HomeDirError> {
    etcetera::choose_app_strategy(etcetera::AppStrategyArgs {
        top_level_domain: "com".to_string(),
        author: "file2prompt".to_string(),
        app_name: "file2prompt".to_string(),
    })
}

pub fn default_config_path() -> Option<std::path::PathBuf> {
    use etcetera::AppStrategy;
    app_dirs().map(|d| d.config_dir().join(CONFIG_FILE_NAME)).ok()
}

pub fn default_data_dir() -> Option<std::path::PathBuf> {
    use etcetera::AppStrategy;
    app_dirs().map(|d| d.data_dir().join("exports")).ok()
}

/// Contents of `config.yml`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigFile {
    pub data_dir: Option<String>,
    pub utc_offset: Option<String>,
}

merde::derive! {
    impl (Deserialize) for struct ConfigFile { data_dir, utc_offset }
}

#[derive(Debug)]
pub enum ConfigParseError {
    Deserialize(merde::MerdeError<'static>),
    NotUtf8(std::str::Utf8Error),
    UnreadableFile(std::io::Error),
    BadUtcOffset(String),
    NoDataDir,
}

impl From<merde::MerdeError<'_>> for ConfigParseError {
    fn from(value: merde::MerdeError<'_>) -> Self {
        use merde::IntoStatic;
        Self::Deserialize(value.into_static())
    }
}

impl From<std::str::Utf8Error> for ConfigParseError {
    fn from(value: std::str::Utf8Error) -> Self {
        Self::NotUtf8(value)
    }
}

#[rustfmt::skip]
impl std::fmt::Display for ConfigParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deserialize(e)
                => write!(f, "{}", e),
            Self::NotUtf8(e)
                => write!(f, "{}", e),
            Self::UnreadableFile(e)
                => write!(f, "{}", e),
            Self::BadUtcOffset(offset)
                => write!(f, "utc_offset {:?} is not of the form +HH:MM", offset),
            Self::NoDataDir
                => write!(f, "no data directory configured and no home directory to default to"),
        }
    }
}

impl std::error::Error for ConfigParseError {}

impl From<ConfigParseError> for std::io::Error {
    fn from(value: ConfigParseError) -> Self {
        match value {
            ConfigParseError::UnreadableFile(e) => e,
            e => std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
        }
    }
}

impl ConfigFile {
    /// Load an explicitly named file, or the default one if it exists.
    /// A missing default file is not an error.
    pub fn load(path: &Option<std::path::PathBuf>) -> Result<Option<Self>, ConfigParseError> {
        let path = match path {
            Some(path) => path.to_owned(),
            None => match default_config_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(None),
            },
        };
        log::debug!("reading config from {:?}", path);
        let config_bytes = std::fs::read(&path).map_err(ConfigParseError::UnreadableFile)?;
        let config_str = std::str::from_utf8(&config_bytes)?;
        Self::load_from_str(config_str).map(Some)
    }

    pub fn load_from_str(config_str: &str) -> Result<Self, ConfigParseError> {
        if config_str.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(merde::yaml::from_str::<ConfigFile>(config_str)?)
    }

    /// Keys set in `overrides` win.
    pub fn merge(self, overrides: ConfigFile) -> Self {
        Self {
            data_dir: overrides.data_dir.or(self.data_dir),
            utc_offset: overrides.utc_offset.or(self.utc_offset),
        }
    }
}

/// Fully resolved settings handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: std::path::PathBuf,
    pub utc_offset: chrono::FixedOffset,
}

impl Settings {
    pub fn resolve(config: ConfigFile) -> Result<Self, ConfigParseError> {
        let data_dir = match config.data_dir {
            Some(dir) => std::path::PathBuf::from(dir),
            None => default_data_dir().ok_or(ConfigParseError::NoDataDir)?,
        };
        let utc_offset =
            parse_utc_offset(config.utc_offset.as_deref().unwrap_or(DEFAULT_UTC_OFFSET))?;
        Ok(Self {
            data_dir,
            utc_offset,
        })
    }
}

pub fn parse_utc_offset(offset: &str) -> Result<chrono::FixedOffset, ConfigParseError> {
    offset
        .trim()
        .parse::<chrono::FixedOffset>()
        .map_err(|_| ConfigParseError::BadUtcOffset(offset.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(ConfigFile::load_from_str("").unwrap(), ConfigFile::default());
        assert_eq!(ConfigFile::load_from_str("  \n").unwrap(), ConfigFile::default());
    }

    #[test]
    fn partial_config() {
        let config = ConfigFile::load_from_str("utc_offset: \"-05:30\"\n").unwrap();
        assert_eq!(config.data_dir, None);
        assert_eq!(config.utc_offset.as_deref(), Some("-05:30"));
    }

    #[test]
    fn overrides_win() {
        let file = ConfigFile {
            data_dir: Some("/srv/exports".to_string()),
            utc_offset: Some("+01:00".to_string()),
        };
        let flags = ConfigFile {
            data_dir: None,
            utc_offset: Some("+02:00".to_string()),
        };
        let merged = file.merge(flags);
        assert_eq!(merged.data_dir.as_deref(), Some("/srv/exports"));
        assert_eq!(merged.utc_offset.as_deref(), Some("+02:00"));
    }

    #[test]
    fn resolve_defaults_to_jst() {
        let settings = Settings::resolve(ConfigFile {
            data_dir: Some("exports".to_string()),
            utc_offset: None,
        })
        .unwrap();
        assert_eq!(settings.data_dir, std::path::PathBuf::from("exports"));
        assert_eq!(settings.utc_offset.local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn bad_offset() {
        assert!(matches!(
            parse_utc_offset("nine"),
            Err(ConfigParseError::BadUtcOffset(_))
        ));
        assert_eq!(parse_utc_offset("-05:00").unwrap().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Some(dir.path().join("nope.yml"));
        assert!(matches!(
            ConfigFile::load(&missing),
            Err(ConfigParseError::UnreadableFile(_))
        ));
        let present = dir.path().join("config.yml");
        std::fs::write(&present, "data_dir: /tmp/f2p\n").unwrap();
        let loaded = ConfigFile::load(&Some(present)).unwrap().unwrap();
        assert_eq!(loaded.data_dir.as_deref(), Some("/tmp/f2p"));
    }
}
