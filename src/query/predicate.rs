//! Predicate model: the comparisons a query node can place on a field.
//!
//! Builders never hand predicates around directly; they collect typed
//! [`StrFilter`] / [`IntFilter`] values and expand them into a flat list of
//! [`Predicate`]s per field. Several predicates on one field are
//! alternatives, predicates on different fields must all hold.

/// A literal compared against a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

/// One comparison on a named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Eq { field: String, value: Value },
    /// The field is present on the node.
    Has { field: String },
    Contains { field: String, value: String },
    EndsWith { field: String, value: String },
    Gt { field: String, value: i64 },
    Lt { field: String, value: i64 },
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn has(field: impl Into<String>) -> Self {
        Predicate::Has {
            field: field.into(),
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::Contains {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn ends_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::EndsWith {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn gt(field: impl Into<String>, value: i64) -> Self {
        Predicate::Gt {
            field: field.into(),
            value,
        }
    }

    pub fn lt(field: impl Into<String>, value: i64) -> Self {
        Predicate::Lt {
            field: field.into(),
            value,
        }
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Field the predicate is attached to.
    pub fn field(&self) -> &str {
        match self {
            Predicate::Eq { field, .. }
            | Predicate::Has { field }
            | Predicate::Contains { field, .. }
            | Predicate::EndsWith { field, .. }
            | Predicate::Gt { field, .. }
            | Predicate::Lt { field, .. } => field.as_str(),
            Predicate::Not(inner) => inner.field(),
        }
    }

    pub fn is_negated(&self) -> bool {
        matches!(self, Predicate::Not(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrOp {
    Eq,
    Contains,
    EndsWith,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StrCmp {
    op: StrOp,
    value: String,
    negated: bool,
}

/// Alternatives for a string field.
///
/// ```
/// use analyzerlib::StrFilter;
///
/// let filter = StrFilter::new()
///     .ends_with("svchost.exe")
///     .not_contains("windows\\system32");
/// ```
///
/// An empty filter still asks for the field to be present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrFilter {
    cmps: Vec<StrCmp>,
}

impl StrFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(self, value: impl Into<String>) -> Self {
        self.push(StrOp::Eq, value.into(), false)
    }

    pub fn not_eq(self, value: impl Into<String>) -> Self {
        self.push(StrOp::Eq, value.into(), true)
    }

    /// Any of the values, as equality alternatives.
    pub fn eq_any<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values.into_iter().fold(self, |f, v| f.eq(v))
    }

    pub fn contains(self, value: impl Into<String>) -> Self {
        self.push(StrOp::Contains, value.into(), false)
    }

    pub fn not_contains(self, value: impl Into<String>) -> Self {
        self.push(StrOp::Contains, value.into(), true)
    }

    pub fn ends_with(self, value: impl Into<String>) -> Self {
        self.push(StrOp::EndsWith, value.into(), false)
    }

    pub fn not_ends_with(self, value: impl Into<String>) -> Self {
        self.push(StrOp::EndsWith, value.into(), true)
    }

    fn push(mut self, op: StrOp, value: String, negated: bool) -> Self {
        self.cmps.push(StrCmp { op, value, negated });
        self
    }

    pub(crate) fn into_predicates(self, field: &'static str) -> Vec<Predicate> {
        if self.cmps.is_empty() {
            return vec![Predicate::has(field)];
        }
        self.cmps
            .into_iter()
            .map(|cmp| {
                let pred = match cmp.op {
                    StrOp::Eq => Predicate::eq(field, cmp.value),
                    StrOp::Contains => Predicate::contains(field, cmp.value),
                    StrOp::EndsWith => Predicate::ends_with(field, cmp.value),
                };
                if cmp.negated {
                    pred.negate()
                } else {
                    pred
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntOp {
    Eq,
    Gt,
    Lt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IntCmp {
    op: IntOp,
    value: i64,
    negated: bool,
}

/// Alternatives for an integer field. An empty filter asks for presence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntFilter {
    cmps: Vec<IntCmp>,
}

impl IntFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(self, value: i64) -> Self {
        self.push(IntOp::Eq, value, false)
    }

    pub fn not_eq(self, value: i64) -> Self {
        self.push(IntOp::Eq, value, true)
    }

    pub fn eq_any(self, values: impl IntoIterator<Item = i64>) -> Self {
        values.into_iter().fold(self, |f, v| f.eq(v))
    }

    pub fn gt(self, value: i64) -> Self {
        self.push(IntOp::Gt, value, false)
    }

    pub fn not_gt(self, value: i64) -> Self {
        self.push(IntOp::Gt, value, true)
    }

    pub fn lt(self, value: i64) -> Self {
        self.push(IntOp::Lt, value, false)
    }

    pub fn not_lt(self, value: i64) -> Self {
        self.push(IntOp::Lt, value, true)
    }

    fn push(mut self, op: IntOp, value: i64, negated: bool) -> Self {
        self.cmps.push(IntCmp { op, value, negated });
        self
    }

    pub(crate) fn into_predicates(self, field: &'static str) -> Vec<Predicate> {
        if self.cmps.is_empty() {
            return vec![Predicate::has(field)];
        }
        self.cmps
            .into_iter()
            .map(|cmp| {
                let pred = match cmp.op {
                    IntOp::Eq => Predicate::eq(field, cmp.value),
                    IntOp::Gt => Predicate::gt(field, cmp.value),
                    IntOp::Lt => Predicate::lt(field, cmp.value),
                };
                if cmp.negated {
                    pred.negate()
                } else {
                    pred
                }
            })
            .collect()
    }
}
