use std::collections::HashMap;

/// Durable unit for one completed conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionRecord {
    pub id: String,
    pub timestamp: String,
    pub original_files: Vec<String>,
    pub file_count: u64,
    pub content: String,
    pub original_contents: HashMap<String, String>,
}

/// What listings and `save` hand back: the record minus its text.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionSummary {
    pub id: String,
    pub timestamp: String,
    pub original_files: Vec<String>,
    pub file_count: u64,
}

merde::derive! {
    impl (Serialize) for struct ConversionRecord {
        id, timestamp, original_files, file_count, content, original_contents
    }
}

merde::derive! {
    impl (Serialize) for struct ConversionSummary {
        id, timestamp, original_files, file_count
    }
}

/// Record as found on disk. Documents written before `original_contents`
/// existed are still readable; the map is re-derived from `content`.
#[derive(Debug)]
struct StoredRecord {
    id: String,
    timestamp: String,
    original_files: Vec<String>,
    file_count: u64,
    content: String,
    original_contents: Option<HashMap<String, String>>,
}

fn missing<'de>(property: &'static str) -> merde::MerdeError<'de> {
    merde::MerdeError::MissingProperty(merde::CowStr::copy_from_str(property))
}

// unknown keys are consumed as `merde::Value` and dropped
impl<'de> merde::Deserialize<'de> for StoredRecord {
    async fn deserialize(
        de: &mut dyn merde::DynDeserializer<'de>,
    ) -> Result<Self, merde::MerdeError<'de>> {
        use merde::DynDeserializerExt;
        let mut id: Option<String> = None;
        let mut timestamp: Option<String> = None;
        let mut original_files: Option<Vec<String>> = None;
        let mut file_count: Option<u64> = None;
        let mut content: Option<String> = None;
        let mut original_contents: Option<HashMap<String, String>> = None;
        de.next().await?.into_map_start()?;
        loop {
            match de.next().await? {
                merde::Event::Str(key) => {
                    if key == "id" {
                        id = Some(de.t().await?);
                    } else if key == "timestamp" {
                        timestamp = Some(de.t().await?);
                    } else if key == "original_files" {
                        original_files = Some(de.t().await?);
                    } else if key == "file_count" {
                        file_count = Some(de.t().await?);
                    } else if key == "content" {
                        content = Some(de.t().await?);
                    } else if key == "original_contents" {
                        original_contents = de.t().await?;
                    } else {
                        let _: merde::Value<'de> = de.t().await?;
                    }
                }
                merde::Event::MapEnd => break,
                e => {
                    return Err(merde::MerdeError::UnexpectedEvent {
                        got: merde::EventType::from(&e),
                        expected: &[merde::EventType::Str],
                        help: None,
                    })
                }
            }
        }
        Ok(StoredRecord {
            id: id.ok_or_else(|| missing("id"))?,
            timestamp: timestamp.ok_or_else(|| missing("timestamp"))?,
            original_files: original_files.ok_or_else(|| missing("original_files"))?,
            file_count: file_count.ok_or_else(|| missing("file_count"))?,
            content: content.ok_or_else(|| missing("content"))?,
            original_contents,
        })
    }
}

impl StoredRecord {
    fn into_record(self) -> ConversionRecord {
        let StoredRecord {
            id,
            timestamp,
            original_files,
            file_count,
            content,
            original_contents,
        } = self;
        let original_contents =
            original_contents.unwrap_or_else(|| extract_original_contents(&content));
        ConversionRecord {
            id,
            timestamp,
            original_files,
            file_count,
            content,
            original_contents,
        }
    }
}

impl ConversionRecord {
    /// Build a record stamped at `now`. Originals are re-derived from `content`.
    pub fn new(
        now: &chrono::DateTime<chrono::FixedOffset>,
        content: String,
        original_files: Vec<String>,
    ) -> Self {
        let original_contents = extract_original_contents(&content);
        Self {
            id: generate_id(now),
            timestamp: format_timestamp(now),
            file_count: original_files.len() as u64,
            original_files,
            content,
            original_contents,
        }
    }

    pub fn summary(&self) -> ConversionSummary {
        ConversionSummary {
            id: self.id.clone(),
            timestamp: self.timestamp.clone(),
            original_files: self.original_files.clone(),
            file_count: self.file_count,
        }
    }

    pub fn original_file_content(&self, filename: &str) -> Option<&str> {
        self.original_contents.get(filename).map(String::as_str)
    }

    pub fn to_json(&self) -> Result<String, String> {
        merde::json::to_string(self).map_err(|e| e.to_string())
    }

    /// Parse a stored document; `None` when it isn't a well-formed record.
    pub fn from_json(document: &str) -> Option<Self> {
        match merde::json::from_str::<StoredRecord>(document) {
            Ok(stored) => Some(stored.into_record()),
            Err(e) => {
                log::debug!("not a conversion record: {}", e);
                None
            }
        }
    }
}

impl ConversionSummary {
    pub fn list_to_json(summaries: &[ConversionSummary]) -> Result<String, String> {
        merde::json::to_string(&summaries.to_vec()).map_err(|e| e.to_string())
    }

    pub fn to_json(&self) -> Result<String, String> {
        merde::json::to_string(self).map_err(|e| e.to_string())
    }
}

/// `YYYYMMDD_HHMMSS_` plus 8 hex chars of a fresh v4 uuid.
/// Zero padding keeps lexicographic order chronological.
pub fn generate_id(now: &chrono::DateTime<chrono::FixedOffset>) -> String {
    let token = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", now.format("%Y%m%d_%H%M%S"), &token[..8])
}

/// RFC 3339 with microseconds and an explicit offset, never a bare local time.
pub fn format_timestamp(now: &chrono::DateTime<chrono::FixedOffset>) -> String {
    now.to_rfc3339_opts(chrono::SecondsFormat::Micros, false)
}

/// Recover `filename -> content` from the text produced by
/// [`crate::blocks::format_batch`].
///
/// A `# ` line outside a fence starts a file. Fence lines toggle the fence
/// state and are kept along with everything inside the fence; the first and
/// last kept lines are the fences themselves and are dropped. A header with no
/// fenced lines maps to an empty body. Content that has its own lines starting
/// with three backticks confuses this scan.
pub fn extract_original_contents(formatted: &str) -> HashMap<String, String> {
    let mut originals = HashMap::new();
    let mut current_file: Option<String> = None;
    let mut kept: Vec<&str> = Vec::new();
    let mut in_fence = false;

    let mut flush = |file: Option<String>, kept: &[&str]| {
        if let Some(file) = file {
            let body = match kept.len() {
                0..=2 => String::new(),
                n => kept[1..n - 1].join("\n"),
            };
            originals.insert(file, body);
        }
    };

    for line in formatted.split('\n') {
        if !in_fence && line.starts_with("# ") {
            flush(current_file.take(), &kept);
            current_file = Some(line[2..].trim().to_string());
            kept.clear();
        } else if line.starts_with("```") {
            in_fence = !in_fence;
            kept.push(line);
        } else if in_fence {
            kept.push(line);
        }
    }
    flush(current_file, &kept);
    originals
}
