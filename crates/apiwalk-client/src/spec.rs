//! OpenAPI document → ordered path table
//!
//! Only the parts needed for resolution are kept: the path templates in
//! declaration order, their segments, and which verbs each one declares.

use std::collections::BTreeMap;

use apiwalk_types::{SpecError, Verb};
use serde_json::Value;

/// One segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the navigated segment exactly
    Literal(String),
    /// Matches any navigated segment. `raw` is the segment text as written
    /// (e.g. `{id}` or `{id}.json`), `name` the text between the braces.
    Param { name: String, raw: String },
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw.starts_with('{') {
            let name = raw[1..].split('}').next().unwrap_or_default().to_string();
            Segment::Param { name, raw: raw.to_string() }
        } else {
            Segment::Literal(raw.to_string())
        }
    }

    pub fn is_param(&self) -> bool {
        matches!(self, Segment::Param { .. })
    }
}

/// Descriptor of a single documented operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operation {
    /// operationId from the document, if any
    pub operation_id: Option<String>,
    /// Summary, falling back to description
    pub summary: Option<String>,
    /// First tag
    pub tag: Option<String>,
    /// Whether an `application/json` request body is declared
    pub json_body: bool,
}

impl Operation {
    fn from_value(operation: &Value) -> Self {
        let text = |key: &str| operation.get(key).and_then(|v| v.as_str()).map(str::to_string);

        let tag = operation
            .get("tags")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let json_body = operation
            .get("requestBody")
            .and_then(|rb| rb.get("content"))
            .and_then(|c| c.get("application/json"))
            .is_some();

        Self {
            operation_id: text("operationId"),
            summary: text("summary").or_else(|| text("description")),
            tag,
            json_body,
        }
    }
}

/// A declared path template with the operations it supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    template: String,
    segments: Vec<Segment>,
    operations: BTreeMap<Verb, Operation>,
}

impl PathTemplate {
    pub fn new(template: impl Into<String>, operations: BTreeMap<Verb, Operation>) -> Self {
        let template = template.into();
        let segments = template.split('/').filter(|s| !s.is_empty()).map(Segment::parse).collect();
        Self { template, segments, operations }
    }

    /// The template as written in the document, e.g. `/users/{id}`.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn operation(&self, verb: Verb) -> Option<&Operation> {
        self.operations.get(&verb)
    }

    pub fn verbs(&self) -> impl Iterator<Item = Verb> + '_ {
        self.operations.keys().copied()
    }
}

/// Immutable path table of one OpenAPI document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Specification {
    title: Option<String>,
    version: Option<String>,
    templates: Vec<PathTemplate>,
}

impl Specification {
    /// Builds the path table from a parsed document.
    ///
    /// Templates keep the order of the document's `paths` object, which
    /// decides ties during resolution.
    pub fn from_value(document: &Value) -> Result<Self, SpecError> {
        let paths =
            document.get("paths").and_then(|p| p.as_object()).ok_or(SpecError::MissingPaths)?;

        let mut templates = Vec::with_capacity(paths.len());
        for (template, item) in paths {
            let item = item.as_object().ok_or_else(|| SpecError::InvalidPathItem {
                template: template.clone(),
                message: "path item is not an object".to_string(),
            })?;

            let operations = Verb::ALL
                .into_iter()
                .filter_map(|verb| {
                    item.get(verb.as_str())
                        .filter(|op| op.is_object())
                        .map(|op| (verb, Operation::from_value(op)))
                })
                .collect();

            templates.push(PathTemplate::new(template.as_str(), operations));
        }

        let info = document.get("info");
        let info_text =
            |key: &str| info.and_then(|i| i.get(key)).and_then(|v| v.as_str()).map(str::to_string);

        Ok(Self { title: info_text("title"), version: info_text("version"), templates })
    }

    pub fn from_json_str(text: &str) -> Result<Self, SpecError> {
        let document: Value =
            serde_json::from_str(text).map_err(|e| SpecError::from_json_error(&e))?;
        Self::from_value(&document)
    }

    /// Path templates in declaration order.
    pub fn templates(&self) -> &[PathTemplate] {
        &self.templates
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
