//! Rule selection and execution.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{Result, ToolkitError};
use crate::rules::{PrepareContext, RuleEntry, RuleTable};

/// Variables every preparation starts from.
pub const BASE_VARS: [&str; 3] = ["LDFLAGS", "CPPFLAGS", "LIBS"];

/// Rules for the given dependency names, in priority order, each at most
/// once. Fails on the first name no rule handles.
pub fn select<'t, S: AsRef<str>>(table: &'t RuleTable, names: &[S]) -> Result<Vec<&'t RuleEntry>> {
    let mut positions = BTreeSet::new();
    for name in names {
        let name = name.as_ref();
        let position = table
            .position(name)
            .ok_or_else(|| ToolkitError::UnknownDependency {
                name: name.to_string(),
            })?;
        positions.insert(position);
    }
    Ok(positions.into_iter().map(|i| &table.entries()[i]).collect())
}

/// Run the rules selected by `names` against `cx`. Without any name the
/// toolkit name itself selects the rule. Returns the canonical names of
/// the rules that ran.
pub fn run<S: AsRef<str>>(
    table: &RuleTable,
    toolkit_name: &str,
    names: &[S],
    cx: &mut PrepareContext<'_>,
) -> Result<Vec<&'static str>> {
    let mut selected = select(table, names)?;
    if selected.is_empty() {
        let entry = table
            .find(toolkit_name)
            .ok_or_else(|| ToolkitError::UnknownToolkit {
                name: toolkit_name.to_string(),
            })?;
        debug!(toolkit = toolkit_name, "no known toolkit dependencies, preparing by toolkit name");
        selected.push(entry);
    }

    for key in BASE_VARS {
        cx.vars.set(key, "");
    }

    let mut ran = Vec::with_capacity(selected.len());
    for entry in selected {
        debug!(rule = entry.name(), priority = entry.priority, "running preparation rule");
        entry.rule.prepare(cx)?;
        ran.push(entry.name());
    }
    Ok(ran)
}
