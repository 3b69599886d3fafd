//! Admission form validation and simulated submission.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! | Field | Control | Rule |
//! |-------|---------|------|
//! | name | `input[name=name]` | non-empty after trim |
//! | email | `input[name=email]` | non-empty after trim, one `@`, a `.` in the domain |
//! | phone | `input[name=phone]` | non-empty after trim |
//! | course | `select[name=course]` | non-empty |
//!
//! A control missing from the markup has its check skipped.
//!
//! Nothing is sent anywhere. A passing form produces a [`Submission`], the
//! hook for wiring a real backend, then shows the confirmation and resets.

use super::Missing;
use crate::config::{BehaviorConfig, MarkupConfig};
use crate::dom::{Document, NodeId, Selector};
use crate::events::{EventKind, Handler, Registry};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Minimal email shape check: `local@domain.tld`, no whitespace, one `@`.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Phone,
    Course,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Phone, Field::Course];

    fn selector(self) -> Selector {
        let (tag, name) = match self {
            Self::Name => ("input", "name"),
            Self::Email => ("input", "email"),
            Self::Phone => ("input", "phone"),
            Self::Course => ("select", "course"),
        };
        Selector::tag(tag).with_attr_eq("name", name)
    }

    pub fn message(self, config: &BehaviorConfig) -> &str {
        let messages = &config.messages;
        match self {
            Self::Name => &messages.name_required,
            Self::Email => &messages.email_invalid,
            Self::Phone => &messages.phone_required,
            Self::Course => &messages.course_required,
        }
    }
}

/// Raw control values; `None` when the control is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub course: Option<String>,
}

/// A validated application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub course: String,
}

/// Validate in order, returning the first failing field.
pub fn validate(values: &FieldValues) -> Result<Submission, Field> {
    let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());

    if blank(&values.name) {
        return Err(Field::Name);
    }
    if let Some(email) = &values.email {
        if email.trim().is_empty() || !is_valid_email(email) {
            return Err(Field::Email);
        }
    }
    if blank(&values.phone) {
        return Err(Field::Phone);
    }
    if values.course.as_deref().is_some_and(str::is_empty) {
        return Err(Field::Course);
    }

    let owned = |v: &Option<String>| v.clone().unwrap_or_default();
    Ok(Submission {
        name: owned(&values.name),
        email: owned(&values.email),
        phone: owned(&values.phone),
        course: owned(&values.course),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "field", rename_all = "lowercase")]
pub enum FormStatus {
    Idle,
    Invalid(Field),
    Sent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FormOutcome {
    Rejected(Field),
    Submitted(Submission),
}

#[derive(Debug, Clone)]
pub struct AdmissionForm {
    form: NodeId,
    status_node: Option<NodeId>,
    fields: [Option<NodeId>; 4],
    status: FormStatus,
    last_submission: Option<Submission>,
}

impl AdmissionForm {
    pub(super) fn setup(
        doc: &mut Document,
        markup: &MarkupConfig,
        registry: &mut Registry,
    ) -> Result<Self, Missing> {
        let form = doc
            .get_element_by_id(&markup.form_id)
            .ok_or_else(|| Missing::id(&markup.form_id))?;
        registry.bind(form, EventKind::Submit, Handler::SubmitAdmission);
        if let Some(clear) = doc.get_element_by_id(&markup.form_clear_id) {
            registry.bind(clear, EventKind::Click, Handler::ClearAdmission);
        }

        Ok(Self {
            form,
            status_node: doc.get_element_by_id(&markup.form_status_id),
            fields: Field::ALL.map(|f| doc.query_within(form, &f.selector())),
            status: FormStatus::Idle,
            last_submission: None,
        })
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn last_submission(&self) -> Option<&Submission> {
        self.last_submission.as_ref()
    }

    fn field_node(&self, field: Field) -> Option<NodeId> {
        self.fields[field as usize]
    }

    fn values(&self, doc: &Document) -> FieldValues {
        let read = |field| self.field_node(field).map(|n| doc.value(n));
        FieldValues {
            name: read(Field::Name),
            email: read(Field::Email),
            phone: read(Field::Phone),
            course: read(Field::Course),
        }
    }

    pub(super) fn submit(&mut self, doc: &mut Document, config: &BehaviorConfig) -> FormOutcome {
        if let Some(node) = self.status_node {
            doc.set_text_content(node, "");
        }
        match validate(&self.values(doc)) {
            Err(field) => {
                self.status = FormStatus::Invalid(field);
                self.render(doc, config);
                if let Some(node) = self.field_node(field) {
                    doc.focus(node);
                }
                log::info!("admission form rejected: {field:?}");
                FormOutcome::Rejected(field)
            }
            Ok(submission) => {
                self.status = FormStatus::Sent;
                self.render(doc, config);
                doc.reset_form(self.form);
                log::info!("admission form accepted for {}", submission.email);
                self.last_submission = Some(submission.clone());
                FormOutcome::Submitted(submission)
            }
        }
    }

    pub(super) fn clear(&mut self, doc: &mut Document) {
        doc.reset_form(self.form);
        self.status = FormStatus::Idle;
        if let Some(node) = self.status_node {
            doc.set_text_content(node, "");
        }
    }

    fn render(&self, doc: &mut Document, config: &BehaviorConfig) {
        let Some(node) = self.status_node else {
            return;
        };
        let (text, color) = match self.status {
            FormStatus::Idle => {
                doc.set_text_content(node, "");
                return;
            }
            FormStatus::Invalid(field) => (field.message(config), &config.colors.error),
            FormStatus::Sent => (config.messages.sent.as_str(), &config.colors.success),
        };
        doc.set_text_content(node, text);
        doc.set_style(node, "color", color);
    }
}
