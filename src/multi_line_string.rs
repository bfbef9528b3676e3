/// Notebook text field: either one string or an array of fragments that are
/// concatenated as-is (fragments carry their own newlines).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiLineString(String);

impl AsRef<str> for MultiLineString {
    fn as_ref(&self) -> &str {
        let Self(inner) = self;
        inner
    }
}

impl From<MultiLineString> for String {
    fn from(mls: MultiLineString) -> Self {
        let MultiLineString(inner) = mls;
        inner
    }
}

impl<'de> merde::Deserialize<'de> for MultiLineString {
    async fn deserialize(
        de: &mut dyn merde::DynDeserializer<'de>,
    ) -> Result<Self, merde::MerdeError<'de>> {
        match de.next().await? {
            merde::Event::Str(v) => Ok(MultiLineString(String::from(v))),
            merde::Event::ArrayStart(_) => {
                let mut joined = String::new();
                loop {
                    match de.next().await? {
                        merde::Event::ArrayEnd => break,
                        merde::Event::Str(v) => joined.push_str(&v),
                        ev => Err(merde::MerdeError::UnexpectedEvent {
                            got: merde::EventType::from(&ev),
                            expected: &[merde::EventType::Str],
                            help: Some(String::from(
                                "notebook text must be a string or an array of strings",
                            )),
                        })?,
                    }
                }
                Ok(MultiLineString(joined))
            }
            ev => Err(merde::MerdeError::UnexpectedEvent {
                got: merde::EventType::from(&ev),
                expected: &[merde::EventType::Str, merde::EventType::ArrayStart],
                help: Some(String::from(
                    "notebook text must be a string or an array of strings",
                )),
            })?,
        }
    }
}
