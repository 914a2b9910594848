//! Byte budget counter
//!
//! Some targets store each text line in a fixed-size buffer, so an edited
//! line must not cost more bytes than the line it replaces. Costs come from
//! a configurable byte map; at each position the longest defined token that
//! matches is consumed (ties go to the entry defined first), otherwise one
//! character is consumed at the default cost.

use std::collections::HashMap;

use serde::Serialize;

use crate::settings::{AppSettings, ByteMapEntry};

/// Compiled token cost table
#[derive(Debug, Clone, Default)]
pub struct ByteMap {
    /// Entries bucketed by first character, longest token first
    by_first: HashMap<char, Vec<(String, u32)>>,
    default_cost: u32,
}

impl ByteMap {
    pub fn new(entries: &[ByteMapEntry], default_cost: u32) -> Self {
        let mut by_first: HashMap<char, Vec<(String, u32)>> = HashMap::new();
        for entry in entries {
            let Some(first) = entry.token.chars().next() else {
                continue;
            };
            by_first
                .entry(first)
                .or_default()
                .push((entry.token.clone(), entry.bytes));
        }
        for bucket in by_first.values_mut() {
            // Stable, so equal lengths keep definition order
            bucket.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        }
        Self {
            by_first,
            default_cost,
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(&settings.byte_map, settings.default_byte_value)
    }

    /// Total cost of `text`
    pub fn cost(&self, text: &str) -> u64 {
        let mut total = 0u64;
        let mut rest = text;
        while let Some(first) = rest.chars().next() {
            let matched = self
                .by_first
                .get(&first)
                .and_then(|bucket| bucket.iter().find(|(token, _)| rest.starts_with(token.as_str())));
            let (len, cost) = match matched {
                Some((token, cost)) => (token.len(), *cost),
                None => (first.len_utf8(), self.default_cost),
            };
            total += u64::from(cost);
            rest = &rest[len..];
        }
        total
    }

    /// Cost of each `\n`-separated line
    pub fn line_costs(&self, text: &str) -> Vec<u64> {
        text.split('\n')
            .map(|line| self.cost(line.strip_suffix('\r').unwrap_or(line)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineBudget {
    pub used: u64,
    /// Cost of the matching reference line; 0 when there is none
    pub limit: u64,
}

impl LineBudget {
    pub fn is_over(&self) -> bool {
        self.used > self.limit
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BudgetReport {
    pub lines: Vec<LineBudget>,
}

impl BudgetReport {
    pub fn is_over(&self) -> bool {
        self.lines.iter().any(LineBudget::is_over)
    }

    pub fn over_lines(&self) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.is_over())
            .map(|(i, _)| i)
            .collect()
    }
}

/// Compare an edited block line by line against its reference block
pub fn compare(map: &ByteMap, edited: &str, reference: &str) -> BudgetReport {
    let limits = map.line_costs(reference);
    let lines = map
        .line_costs(edited)
        .into_iter()
        .enumerate()
        .map(|(i, used)| LineBudget {
            used,
            limit: limits.get(i).copied().unwrap_or(0),
        })
        .collect();
    BudgetReport { lines }
}
