//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Typed query predicates and paging.

use crate::dialect::Dialect;
use crate::value::Value;

/// Binary comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "<>",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        }
    }
}

/// A filter over an entity's columns.
///
/// Column names are checked against the entity's declared columns before any SQL is rendered.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Predicate {
    /// Matches every row.
    #[default]
    All,
    Compare {
        column: &'static str,
        op: Comparison,
        value: Value,
    },
    IsNull(&'static str),
    IsNotNull(&'static str),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    fn compare(column: &'static str, op: Comparison, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            column,
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Self::compare(column, Comparison::Eq, value)
    }

    pub fn ne(column: &'static str, value: impl Into<Value>) -> Self {
        Self::compare(column, Comparison::Ne, value)
    }

    pub fn lt(column: &'static str, value: impl Into<Value>) -> Self {
        Self::compare(column, Comparison::Lt, value)
    }

    pub fn le(column: &'static str, value: impl Into<Value>) -> Self {
        Self::compare(column, Comparison::Le, value)
    }

    pub fn gt(column: &'static str, value: impl Into<Value>) -> Self {
        Self::compare(column, Comparison::Gt, value)
    }

    pub fn ge(column: &'static str, value: impl Into<Value>) -> Self {
        Self::compare(column, Comparison::Ge, value)
    }

    pub fn is_null(column: &'static str) -> Self {
        Predicate::IsNull(column)
    }

    pub fn is_not_null(column: &'static str) -> Self {
        Predicate::IsNotNull(column)
    }

    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::All => other,
            Predicate::And(mut terms) => {
                terms.push(other);
                Predicate::And(terms)
            }
            this => Predicate::And(vec![this, other]),
        }
    }

    pub fn or(self, other: Predicate) -> Self {
        match self {
            Predicate::Or(mut terms) => {
                terms.push(other);
                Predicate::Or(terms)
            }
            this => Predicate::Or(vec![this, other]),
        }
    }

    /// Every column referenced by this predicate.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = Vec::new();
        self.collect_columns(&mut columns);
        columns
    }

    fn collect_columns(&self, columns: &mut Vec<&'static str>) {
        match self {
            Predicate::All => {}
            Predicate::Compare { column, .. }
            | Predicate::IsNull(column)
            | Predicate::IsNotNull(column) => columns.push(*column),
            Predicate::And(terms) | Predicate::Or(terms) => {
                terms.iter().for_each(|term| term.collect_columns(columns))
            }
            Predicate::Not(inner) => inner.collect_columns(columns),
        }
    }

    /// Render as a SQL condition, appending bound parameters to `params`.
    pub(crate) fn render(&self, dialect: &dyn Dialect, params: &mut Vec<Value>) -> String {
        match self {
            Predicate::All => "1 = 1".to_string(),
            Predicate::Compare { column, op, value } => {
                params.push(value.clone());
                format!(
                    "{} {} {}",
                    dialect.quote(column),
                    op.as_sql(),
                    dialect.placeholder(params.len())
                )
            }
            Predicate::IsNull(column) => format!("{} IS NULL", dialect.quote(column)),
            Predicate::IsNotNull(column) => format!("{} IS NOT NULL", dialect.quote(column)),
            Predicate::And(terms) if terms.is_empty() => "1 = 1".to_string(),
            Predicate::Or(terms) if terms.is_empty() => "1 = 0".to_string(),
            Predicate::And(terms) => Self::join(terms, " AND ", dialect, params),
            Predicate::Or(terms) => Self::join(terms, " OR ", dialect, params),
            Predicate::Not(inner) => format!("NOT ({})", inner.render(dialect, params)),
        }
    }

    fn join(
        terms: &[Predicate],
        separator: &str,
        dialect: &dyn Dialect,
        params: &mut Vec<Value>,
    ) -> String {
        let rendered: Vec<String> = terms
            .iter()
            .map(|term| format!("({})", term.render(dialect, params)))
            .collect();
        rendered.join(separator)
    }
}

impl std::ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        Predicate::Not(Box::new(self))
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::All => write!(f, "*"),
            Predicate::Compare { column, op, value } => {
                write!(f, "{} {} {}", column, op.as_sql(), value)
            }
            Predicate::IsNull(column) => write!(f, "{} IS NULL", column),
            Predicate::IsNotNull(column) => write!(f, "{} IS NOT NULL", column),
            Predicate::And(terms) => write_joined(f, terms, " AND "),
            Predicate::Or(terms) => write_joined(f, terms, " OR "),
            Predicate::Not(inner) => write!(f, "NOT ({})", inner),
        }
    }
}

fn write_joined(
    f: &mut std::fmt::Formatter<'_>,
    terms: &[Predicate],
    separator: &str,
) -> std::fmt::Result {
    for (index, term) in terms.iter().enumerate() {
        if index > 0 {
            write!(f, "{}", separator)?;
        }
        write!(f, "({})", term)?;
    }
    Ok(())
}

/// Offset/limit paging.
///
/// Offsets are 64-bit but backends interpret them as signed, so pages past `i64::MAX` rows are
/// not addressable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Page {
    pub start: u64,
    pub size: u64,
}

impl Page {
    pub fn new(start: u64, size: u64) -> Self {
        Self { start, size }
    }
}

/// A read request: filter plus optional page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Select {
    pub predicate: Predicate,
    pub page: Option<Page>,
}

impl Select {
    pub fn new(predicate: Predicate, page: Option<Page>) -> Self {
        Self { predicate, page }
    }

    /// At most one row matching `predicate`.
    pub fn first(predicate: Predicate) -> Self {
        Self::new(predicate, Some(Page::new(0, 1)))
    }
}

impl std::fmt::Display for Select {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.predicate)?;
        if let Some(page) = self.page {
            write!(f, " [{}+{}]", page.start, page.size)?;
        }
        Ok(())
    }
}
