//! Text rendering of balance reports.

use std::fmt;

use factorial_blueprint::balance::{BalanceReport, ItemBalance, NodeCheck, NodeStatus};
use factorial_blueprint::blueprint::Blueprint;
use factorial_blueprint::diagnostics::Diagnostic;
use factorial_blueprint::scale::is_effective_factor;

fn percent(utilization: f64) -> String {
    format!("{:.0}%", utilization * 100.0)
}

/// Title line: name, time unit and scale.
pub struct Header<'a> {
    pub blueprint: &'a Blueprint,
    pub scale: f64,
}

impl fmt::Display for Header<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let meta = &self.blueprint.meta;
        write!(f, "{} ({})", meta.name, meta.tick)?;
        if is_effective_factor(self.scale) {
            write!(f, " x{}", self.scale)?;
        }
        writeln!(f)
    }
}

/// Inspector view of one node.
pub struct NodeText<'a>(pub &'a NodeCheck);

impl fmt::Display for NodeText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let check = self.0;
        let status = check.status();
        writeln!(
            f,
            "  {} ({}) x{}  {}",
            check.label, check.kind, check.machines, status
        )?;
        writeln!(f, "    {}", status.summary())?;
        if check.input_rows.is_empty() {
            writeln!(f, "    in   -")?;
        }
        for row in &check.input_rows {
            writeln!(
                f,
                "    in   {}  need {} | got {} | {}",
                row.item,
                row.need,
                row.got,
                percent(row.utilization)
            )?;
        }
        if check.output_rows.is_empty() {
            writeln!(f, "    out  -")?;
        }
        for row in &check.output_rows {
            writeln!(
                f,
                "    out  {}  prod {} | sent {} | {}",
                row.item,
                row.prod,
                row.sent,
                percent(row.utilization)
            )?;
        }
        Ok(())
    }
}

/// The item ledger.
pub struct LedgerText<'a>(pub &'a [ItemBalance]);

impl fmt::Display for LedgerText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "System Balance")?;
        if self.0.is_empty() {
            return writeln!(f, "  No items found.");
        }
        for entry in self.0 {
            writeln!(
                f,
                "  {}  prod {} | cons {} | net {}",
                entry.item, entry.produced, entry.consumed, entry.net
            )?;
        }
        Ok(())
    }
}

/// Ignored entries, if any.
pub struct DiagnosticsText<'a>(pub &'a [Diagnostic]);

impl fmt::Display for DiagnosticsText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        writeln!(f, "Diagnostics")?;
        for diagnostic in self.0 {
            writeln!(f, "  - {diagnostic}")?;
        }
        Ok(())
    }
}

/// Full `check` output.
pub struct CheckText<'a> {
    pub blueprint: &'a Blueprint,
    pub scale: f64,
    pub report: &'a BalanceReport,
    /// Checks to list. May be a search-filtered subset of the report.
    pub checks: &'a [&'a NodeCheck],
    pub diagnostics: &'a [Diagnostic],
}

impl fmt::Display for CheckText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            Header {
                blueprint: self.blueprint,
                scale: self.scale,
            }
        )?;
        writeln!(f)?;
        writeln!(f, "Node Health")?;
        if self.checks.is_empty() {
            writeln!(f, "  No nodes.")?;
        }
        for check in self.checks {
            write!(f, "{}", NodeText(*check))?;
        }
        writeln!(f)?;
        write!(f, "{}", LedgerText(&self.report.item_balance))?;
        writeln!(f)?;
        writeln!(
            f,
            "{} OK, {} under-routed, {} starving",
            self.report.count(NodeStatus::Ok),
            self.report.count(NodeStatus::UnderRouted),
            self.report.count(NodeStatus::Starving)
        )?;
        if !self.diagnostics.is_empty() {
            writeln!(f)?;
            write!(f, "{}", DiagnosticsText(self.diagnostics))?;
        }
        Ok(())
    }
}
