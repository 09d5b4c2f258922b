use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct JsonErr {
    pub ok: bool,
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Comment fields recognised in a script's header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataField {
    Author,
    Title,
    Version,
    Verified,
    Description,
}

impl MetadataField {
    pub const ALL: [MetadataField; 5] = [
        MetadataField::Author,
        MetadataField::Title,
        MetadataField::Version,
        MetadataField::Verified,
        MetadataField::Description,
    ];

    /// Name as it appears after the comment marker, e.g. `# Title: ...`.
    pub fn label(self) -> &'static str {
        match self {
            MetadataField::Author => "Author",
            MetadataField::Title => "Title",
            MetadataField::Version => "Version",
            MetadataField::Verified => "Verified",
            MetadataField::Description => "Description",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Metadata {
    fields: BTreeMap<MetadataField, String>,
}

impl Metadata {
    pub fn get(&self, field: MetadataField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: MetadataField) -> bool {
        self.fields.contains_key(&field)
    }

    /// Records `value` unless the field was already seen.
    pub fn insert_first(&mut self, field: MetadataField, value: &str) {
        self.fields
            .entry(field)
            .or_insert_with(|| value.to_string());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One registry entry, present only for scripts whose signing succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub script_location: String,
    pub signature_location: String,
    pub passphrase: String,
}

impl ScriptRecord {
    pub fn new(
        metadata: &Metadata,
        script_location: String,
        signature_location: String,
        passphrase: String,
    ) -> Self {
        let take = |f: MetadataField| metadata.get(f).map(str::to_string);
        Self {
            author: take(MetadataField::Author),
            title: take(MetadataField::Title),
            version: take(MetadataField::Version),
            verified: take(MetadataField::Verified),
            description: take(MetadataField::Description),
            script_location,
            signature_location,
            passphrase,
        }
    }
}

/// Ordered collection of records. Serializes as a mapping keyed `"1".."N"`
/// in append order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    records: Vec<ScriptRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ScriptRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[ScriptRecord] {
        &self.records
    }

    /// 1-based positional keys paired with their records.
    pub fn entries(&self) -> impl Iterator<Item = (String, &ScriptRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| ((i + 1).to_string(), r))
    }
}

impl Serialize for Registry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (key, record) in self.entries() {
            map.serialize_entry(&key, record)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipStage {
    Key,
    Sign,
    Read,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedScript {
    pub script: String,
    pub stage: SkipStage,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub registry_path: String,
    pub discovered: usize,
    pub signed: usize,
    pub key_generations: usize,
    pub key_failures: usize,
    pub skipped: Vec<SkippedScript>,
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub script: String,
    pub metadata: Metadata,
}

#[derive(Debug, Serialize)]
pub struct CheckItem {
    pub name: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub overall: String,
    pub checks: Vec<CheckItem>,
}
