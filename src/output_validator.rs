//! Generated markup validation
//!
//! The core receives an injected [`MarkupValidator`] capability. The full XSD
//! validator (libxml2, behind the `libxml2` feature) is used when a schema could be
//! loaded; otherwise the reduced structural check runs: root element name and
//! namespace, required root attributes, and at least one task under `<nodes>`.
//!
//! One deliberate suppression exists: the external schema requires `<datas>` to
//! have children, but a model without data objects legitimately emits an empty
//! `<datas/>`. That violation class is ignored when and only when the input
//! supplied no DataObjects; every other violation is reported verbatim.

use std::fmt;

use crate::error::{ConvertError, Result};
use crate::markup::HAMSTERS_NAMESPACE;

/// A single violation reported against the generated markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupViolation {
    /// Line number in the generated document, when the validator knows it.
    pub line: Option<u32>,
    pub message: String,
}

impl MarkupViolation {
    pub fn new(line: Option<u32>, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for MarkupViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "Line {}: {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Outcome of one validator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupCheck {
    /// The validator ran; an empty list means the markup is valid.
    Checked(Vec<MarkupViolation>),
    /// No validator could run (no schema loaded and no fallback possible).
    Unavailable,
}

/// Injected validation capability for generated markup.
pub trait MarkupValidator {
    fn validate_markup(&self, markup: &[u8]) -> MarkupCheck;

    /// Short description for console reporting.
    fn describe(&self) -> &'static str;
}

/// Result of checking markup, after suppression rules were applied.
#[derive(Debug, Default)]
pub struct OutputReport {
    /// Whether any validator actually ran.
    pub performed: bool,
    /// Violations ignored under the empty-`<datas/>` rule.
    pub suppressed: Vec<MarkupViolation>,
}

/// The libxml2 message emitted for a childless `<datas>` element.
fn is_empty_datas_violation(message: &str) -> bool {
    message.contains(&format!(
        "Element '{{{HAMSTERS_NAMESPACE}}}datas': Missing child element(s)"
    ))
}

/// Run the injected validator and apply the suppression rule.
///
/// `datas_empty` must reflect the input, not the markup: the suppression is scoped
/// exactly to conversions where no DataObjects were supplied.
pub fn check_markup(
    validator: &dyn MarkupValidator,
    markup: &[u8],
    datas_empty: bool,
) -> Result<OutputReport> {
    let violations = match validator.validate_markup(markup) {
        MarkupCheck::Unavailable => return Ok(OutputReport::default()),
        MarkupCheck::Checked(violations) => violations,
    };

    let mut suppressed = Vec::new();
    let mut reported = Vec::new();
    for violation in violations {
        if datas_empty && is_empty_datas_violation(&violation.message) {
            suppressed.push(violation);
        } else {
            reported.push(violation);
        }
    }

    if let Some(first) = reported.first() {
        return Err(ConvertError::OutputSchemaViolation {
            detail: first.to_string(),
        });
    }

    Ok(OutputReport {
        performed: true,
        suppressed,
    })
}

/// Reduced structural check used when no full XSD validator is available.
#[derive(Debug, Default)]
pub struct ReducedMarkupValidator;

impl ReducedMarkupValidator {
    pub fn new() -> Self {
        Self
    }

    fn structural_violations(markup: &[u8]) -> Vec<MarkupViolation> {
        let text = match std::str::from_utf8(markup) {
            Ok(text) => text,
            Err(_) => {
                return vec![MarkupViolation::new(None, "markup is not valid UTF-8")];
            }
        };

        let doc = match roxmltree::Document::parse(text) {
            Ok(doc) => doc,
            Err(err) => {
                let line = u32::try_from(err.pos().row).ok();
                return vec![MarkupViolation::new(line, format!("invalid XML: {err}"))];
            }
        };

        let mut violations = Vec::new();
        let root = doc.root_element();

        if root.tag_name().name() != "hamsters" {
            violations.push(MarkupViolation::new(
                None,
                format!(
                    "root element must be 'hamsters', got '{}'",
                    root.tag_name().name()
                ),
            ));
            return violations;
        }
        if root.tag_name().namespace() != Some(HAMSTERS_NAMESPACE) {
            violations.push(MarkupViolation::new(
                None,
                format!(
                    "invalid namespace: expected {HAMSTERS_NAMESPACE}, got {}",
                    root.tag_name().namespace().unwrap_or("(none)")
                ),
            ));
        }
        if root.attribute("name").is_none() {
            violations.push(MarkupViolation::new(
                None,
                "missing 'name' attribute in root element",
            ));
        }
        match root.attribute("version") {
            None => violations.push(MarkupViolation::new(
                None,
                "missing 'version' attribute in root element",
            )),
            Some(version) if version != "7" => violations.push(MarkupViolation::new(
                None,
                format!("expected version 7, got {version}"),
            )),
            Some(_) => {}
        }
        if root
            .attribute(("http://www.w3.org/2001/XMLSchema-instance", "schemaLocation"))
            .is_none()
        {
            violations.push(MarkupViolation::new(
                None,
                "missing xsi:schemaLocation attribute",
            ));
        }

        let has_task = root
            .children()
            .find(|n| n.tag_name().name() == "nodes")
            .map(|nodes| nodes.children().any(|n| n.tag_name().name() == "task"))
            .unwrap_or(false);
        if !has_task {
            violations.push(MarkupViolation::new(
                None,
                "no task elements found under nodes",
            ));
        }

        violations
    }
}

impl MarkupValidator for ReducedMarkupValidator {
    fn validate_markup(&self, markup: &[u8]) -> MarkupCheck {
        MarkupCheck::Checked(Self::structural_violations(markup))
    }

    fn describe(&self) -> &'static str {
        "reduced structural check"
    }
}

/// Validator stub selected by `--no-validate`.
#[derive(Debug, Default)]
pub struct DisabledValidator;

impl MarkupValidator for DisabledValidator {
    fn validate_markup(&self, _markup: &[u8]) -> MarkupCheck {
        MarkupCheck::Unavailable
    }

    fn describe(&self) -> &'static str {
        "validation disabled"
    }
}

/// Full XSD validator backed by libxml2.
#[cfg(feature = "libxml2")]
pub struct XsdMarkupValidator {
    schema: crate::libxml2::XmlSchemaPtr,
}

#[cfg(feature = "libxml2")]
impl XsdMarkupValidator {
    /// Parse the schema bytes once; validation contexts are created per document.
    pub fn new(schema_bytes: &[u8]) -> Result<Self> {
        let schema = crate::libxml2::parse_schema(schema_bytes)
            .map_err(|e| ConvertError::Cache(format!("schema parse failed: {e}")))?;
        Ok(Self { schema })
    }
}

#[cfg(feature = "libxml2")]
impl MarkupValidator for XsdMarkupValidator {
    fn validate_markup(&self, markup: &[u8]) -> MarkupCheck {
        match crate::libxml2::validate_document(&self.schema, markup) {
            Ok(violations) => MarkupCheck::Checked(
                violations
                    .into_iter()
                    .map(|(line, message)| {
                        MarkupViolation::new(u32::try_from(line).ok(), message)
                    })
                    .collect(),
            ),
            // Internal validator errors mean no trustworthy verdict was produced.
            Err(_) => MarkupCheck::Unavailable,
        }
    }

    fn describe(&self) -> &'static str {
        "libxml2 XSD validation"
    }
}
