//! Form tree: groups, repeatable lists and path navigation

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::FormError;
use super::field::{FieldValue, FormField};
use super::validators::{GroupValidator, ValidationError, ValidationErrors};

/// Dotted location of a node, e.g. `emailGroup.email` or `addresses.0.city`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(path: &str) -> Self {
        Self(
            path.split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Compare against a dotted path without allocating
    pub fn matches(&self, dotted: &str) -> bool {
        self.0
            .iter()
            .map(String::as_str)
            .eq(dotted.split('.').filter(|segment| !segment.is_empty()))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

/// How `patch_values` treats names that do not resolve to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchPolicy {
    /// Reject the whole patch with `UnknownField`
    #[default]
    Strict,
    /// Skip unknown names and apply the rest
    Lenient,
}

/// A leaf assignment computed before any mutation happens
pub(crate) type Assignment = (FieldPath, FieldValue);

fn leaf_value(value: &Value, path: &FieldPath) -> Result<FieldValue, FormError> {
    FieldValue::from_json(value).ok_or_else(|| FormError::InvalidValue { path: path.clone() })
}

/// Any node of the form tree
#[derive(Debug, Clone)]
pub enum FormNode {
    Field(FormField),
    Group(FormGroup),
    List(FormList),
}

impl FormNode {
    pub fn name(&self) -> &str {
        match self {
            FormNode::Field(f) => &f.name,
            FormNode::Group(g) => &g.name,
            FormNode::List(l) => &l.name,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            FormNode::Field(f) => f.is_valid(),
            FormNode::Group(g) => g.is_valid(),
            FormNode::List(l) => l.is_valid(),
        }
    }

    pub fn update_validity(&mut self) {
        match self {
            FormNode::Field(f) => f.update_validity(),
            FormNode::Group(g) => g.update_validity(),
            FormNode::List(l) => l.entries.iter_mut().for_each(FormGroup::update_validity),
        }
    }

    pub fn snapshot(&self) -> Value {
        match self {
            FormNode::Field(f) => f.value().to_json(),
            FormNode::Group(g) => g.snapshot(),
            FormNode::List(l) => l.snapshot(),
        }
    }

    fn reset(&mut self) {
        match self {
            FormNode::Field(f) => f.reset(),
            FormNode::Group(g) => g.reset(),
            FormNode::List(l) => l.reset(),
        }
    }

    fn collect_errors(&self, path: &FieldPath, out: &mut Vec<ValidationError>) {
        match self {
            FormNode::Field(f) => {
                if let Some(errors) = f.errors() {
                    out.extend(errors.iter().map(|kind| ValidationError {
                        kind,
                        path: path.clone(),
                    }));
                }
            }
            FormNode::Group(g) => g.collect_errors_at(path, out),
            FormNode::List(l) => {
                for (index, entry) in l.entries.iter().enumerate() {
                    entry.collect_errors_at(&path.child(index.to_string()), out);
                }
            }
        }
    }

    fn plan_patch(
        &self,
        value: &Value,
        path: &FieldPath,
        policy: PatchPolicy,
        out: &mut Vec<Assignment>,
    ) -> Result<(), FormError> {
        match self {
            FormNode::Field(_) => out.push((path.clone(), leaf_value(value, path)?)),
            FormNode::Group(g) => g.plan_patch(value, path, policy, out)?,
            FormNode::List(l) => l.plan_patch(value, path, policy, out)?,
        }
        Ok(())
    }

    fn plan_replace(
        &self,
        value: &Value,
        path: &FieldPath,
        out: &mut Vec<Assignment>,
    ) -> Result<(), FormError> {
        match self {
            FormNode::Field(_) => out.push((path.clone(), leaf_value(value, path)?)),
            FormNode::Group(g) => g.plan_replace(value, path, out)?,
            FormNode::List(l) => l.plan_replace(value, path, out)?,
        }
        Ok(())
    }
}

/// A named composite of fields, groups and lists with optional
/// group-level validators
#[derive(Debug, Clone)]
pub struct FormGroup {
    pub name: String,
    children: Vec<FormNode>,
    validators: Vec<GroupValidator>,
    errors: Option<ValidationErrors>,
}

impl FormGroup {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: Vec::new(),
            validators: Vec::new(),
            errors: None,
        }
    }

    pub fn with_field(self, field: FormField) -> Self {
        self.with_node(FormNode::Field(field))
    }

    pub fn with_group(self, group: FormGroup) -> Self {
        self.with_node(FormNode::Group(group))
    }

    pub fn with_list(self, list: FormList) -> Self {
        self.with_node(FormNode::List(list))
    }

    pub fn with_validator(mut self, validator: GroupValidator) -> Self {
        self.validators.push(validator);
        self.update_own_validity();
        self
    }

    fn with_node(mut self, node: FormNode) -> Self {
        self.children.push(node);
        self.update_own_validity();
        self
    }

    pub fn children(&self) -> &[FormNode] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&FormNode> {
        self.children.iter().find(|c| c.name() == name)
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut FormNode> {
        self.children.iter_mut().find(|c| c.name() == name)
    }

    /// Direct child field by name
    pub fn field(&self, name: &str) -> Option<&FormField> {
        match self.child(name)? {
            FormNode::Field(f) => Some(f),
            _ => None,
        }
    }

    /// Direct child list by name
    pub fn list(&self, name: &str) -> Option<&FormList> {
        match self.child(name)? {
            FormNode::List(l) => Some(l),
            _ => None,
        }
    }

    pub(crate) fn list_mut(&mut self, name: &str) -> Option<&mut FormList> {
        match self.child_mut(name)? {
            FormNode::List(l) => Some(l),
            _ => None,
        }
    }

    /// Descendant group at `path`; the root path is this group
    pub fn find_group(&self, path: &FieldPath) -> Option<&FormGroup> {
        self.group_at(path.segments())
    }

    /// Descendant field at `path`
    pub fn find_field(&self, path: &FieldPath) -> Option<&FormField> {
        let (last, parents) = path.segments().split_last()?;
        self.group_at(parents)?.field(last)
    }

    pub(crate) fn find_field_mut(&mut self, path: &FieldPath) -> Option<&mut FormField> {
        let (last, parents) = path.segments().split_last()?;
        match self.group_at_mut(parents)?.child_mut(last)? {
            FormNode::Field(f) => Some(f),
            _ => None,
        }
    }

    fn group_at(&self, segments: &[String]) -> Option<&FormGroup> {
        let Some((first, rest)) = segments.split_first() else {
            return Some(self);
        };
        match self.child(first)? {
            FormNode::Group(g) => g.group_at(rest),
            FormNode::List(l) => {
                let (index, rest) = rest.split_first()?;
                l.get(index.parse().ok()?)?.group_at(rest)
            }
            FormNode::Field(_) => None,
        }
    }

    fn group_at_mut(&mut self, segments: &[String]) -> Option<&mut FormGroup> {
        let Some((first, rest)) = segments.split_first() else {
            return Some(self);
        };
        match self.child_mut(first)? {
            FormNode::Group(g) => g.group_at_mut(rest),
            FormNode::List(l) => {
                let (index, rest) = rest.split_first()?;
                l.entries.get_mut(index.parse::<usize>().ok()?)?.group_at_mut(rest)
            }
            FormNode::Field(_) => None,
        }
    }

    /// Recompute validity bottom-up: descendants first, then this group's own validators
    pub fn update_validity(&mut self) {
        self.children.iter_mut().for_each(FormNode::update_validity);
        self.update_own_validity();
    }

    fn update_own_validity(&mut self) {
        let this: &FormGroup = self;
        let errors: ValidationErrors = this
            .validators
            .iter()
            .filter_map(|v| v.validate(this))
            .collect();
        self.errors = errors.into_option();
    }

    /// Failures of this group's own validators only
    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    /// True when this group and every descendant pass
    pub fn is_valid(&self) -> bool {
        self.errors.is_none() && self.children.iter().all(FormNode::is_valid)
    }

    /// Every failing validator below (and including) this group, in tree order
    pub fn collect_errors(&self) -> Vec<ValidationError> {
        let mut out = Vec::new();
        self.collect_errors_at(&FieldPath::root(), &mut out);
        out
    }

    fn collect_errors_at(&self, path: &FieldPath, out: &mut Vec<ValidationError>) {
        if let Some(errors) = &self.errors {
            out.extend(errors.iter().map(|kind| ValidationError {
                kind,
                path: path.clone(),
            }));
        }
        for child in &self.children {
            child.collect_errors(&path.child(child.name()), out);
        }
    }

    pub fn snapshot(&self) -> Value {
        let map: Map<String, Value> = self
            .children
            .iter()
            .map(|c| (c.name().to_string(), c.snapshot()))
            .collect();
        Value::Object(map)
    }

    pub fn reset(&mut self) {
        self.children.iter_mut().for_each(FormNode::reset);
        self.update_own_validity();
    }

    pub(crate) fn plan_patch(
        &self,
        value: &Value,
        path: &FieldPath,
        policy: PatchPolicy,
        out: &mut Vec<Assignment>,
    ) -> Result<(), FormError> {
        let Value::Object(map) = value else {
            return Err(FormError::InvalidValue { path: path.clone() });
        };
        for (key, child_value) in map {
            let child_path = path.child(key.as_str());
            match self.child(key) {
                Some(child) => child.plan_patch(child_value, &child_path, policy, out)?,
                None if policy == PatchPolicy::Lenient => {
                    tracing::debug!(path = %child_path, "skipping unknown field in patch");
                }
                None => return Err(FormError::UnknownField { path: child_path }),
            }
        }
        Ok(())
    }

    pub(crate) fn plan_replace(
        &self,
        value: &Value,
        path: &FieldPath,
        out: &mut Vec<Assignment>,
    ) -> Result<(), FormError> {
        let Value::Object(map) = value else {
            return Err(FormError::InvalidValue { path: path.clone() });
        };
        if let Some(unknown) = map.keys().find(|key| self.child(key).is_none()) {
            return Err(FormError::UnknownField {
                path: path.child(unknown.as_str()),
            });
        }
        for child in &self.children {
            let child_path = path.child(child.name());
            let child_value = map
                .get(child.name())
                .ok_or_else(|| FormError::MissingField {
                    path: child_path.clone(),
                })?;
            child.plan_replace(child_value, &child_path, out)?;
        }
        Ok(())
    }

    /// Apply a previously validated plan and recompute validity
    pub(crate) fn apply(&mut self, plan: Vec<Assignment>) -> Vec<FieldPath> {
        let mut changed = Vec::with_capacity(plan.len());
        for (path, value) in plan {
            if let Some(field) = self.find_field_mut(&path) {
                field.set_value(value);
                changed.push(path);
            }
        }
        self.update_validity();
        changed
    }
}

/// Ordered, append-only sequence of identically shaped groups
#[derive(Debug, Clone)]
pub struct FormList {
    pub name: String,
    entries: Vec<FormGroup>,
    factory: fn() -> FormGroup,
    initial_len: usize,
}

impl FormList {
    /// Create a list holding `initial_len` entries built by `factory`
    pub fn new(name: &str, factory: fn() -> FormGroup, initial_len: usize) -> Self {
        Self {
            name: name.to_string(),
            entries: (0..initial_len).map(|_| factory()).collect(),
            factory,
            initial_len,
        }
    }

    /// Append a fresh entry
    pub fn push(&mut self) {
        self.entries.push((self.factory)());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FormGroup> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[FormGroup] {
        &self.entries
    }

    pub fn is_valid(&self) -> bool {
        self.entries.iter().all(FormGroup::is_valid)
    }

    pub fn snapshot(&self) -> Value {
        Value::Array(self.entries.iter().map(FormGroup::snapshot).collect())
    }

    fn reset(&mut self) {
        self.entries = (0..self.initial_len).map(|_| (self.factory)()).collect();
    }

    fn plan_patch(
        &self,
        value: &Value,
        path: &FieldPath,
        policy: PatchPolicy,
        out: &mut Vec<Assignment>,
    ) -> Result<(), FormError> {
        let Value::Array(items) = value else {
            return Err(FormError::InvalidValue { path: path.clone() });
        };
        for (index, item) in items.iter().enumerate() {
            let entry_path = path.child(index.to_string());
            match self.entries.get(index) {
                Some(entry) => entry.plan_patch(item, &entry_path, policy, out)?,
                None if policy == PatchPolicy::Lenient => {
                    tracing::debug!(path = %entry_path, "skipping missing list entry in patch");
                }
                None => return Err(FormError::UnknownField { path: entry_path }),
            }
        }
        Ok(())
    }

    fn plan_replace(
        &self,
        value: &Value,
        path: &FieldPath,
        out: &mut Vec<Assignment>,
    ) -> Result<(), FormError> {
        let Value::Array(items) = value else {
            return Err(FormError::InvalidValue { path: path.clone() });
        };
        if items.len() > self.entries.len() {
            return Err(FormError::UnknownField {
                path: path.child(self.entries.len().to_string()),
            });
        }
        for (index, entry) in self.entries.iter().enumerate() {
            let entry_path = path.child(index.to_string());
            let item = items.get(index).ok_or_else(|| FormError::MissingField {
                path: entry_path.clone(),
            })?;
            entry.plan_replace(item, &entry_path, out)?;
        }
        Ok(())
    }
}
