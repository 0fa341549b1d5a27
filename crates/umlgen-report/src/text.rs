use colored::Colorize;

use umlgen_core::graph::ClassGraph;
use umlgen_core::pipeline::Analysis;
use umlgen_core::types::{EntityKind, RelationshipKind};

/// Format an analysis for terminal output.
pub fn format_report(analysis: &Analysis) -> String {
    let model = &analysis.model;
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", "umlgen - Class Diagram Analysis".bold()));
    out.push_str(&format!("{}\n\n", "=".repeat(40)));

    let external = model.entities().filter(|e| e.is_external()).count();
    out.push_str(&format!(
        "{}: {} entities ({} external), {} relationships\n",
        "Summary".bold(),
        model.entity_count(),
        external,
        model.relationships().len(),
    ));

    out.push_str(&format!("\n{}\n{}\n", "Entities".bold(), "-".repeat(40)));
    for entity in model.entities() {
        let kind = format!("{:<16}", entity.kind.to_string());
        let kind = match entity.kind {
            EntityKind::External => kind.dimmed(),
            EntityKind::Interface => kind.cyan(),
            _ => kind.normal(),
        };
        out.push_str(&format!("  {kind} {}\n", entity.name));
    }

    if !model.relationships().is_empty() {
        out.push_str(&format!(
            "\n{}\n{}\n",
            "Relationships".bold(),
            "-".repeat(40)
        ));
        let mut counts = [0usize; 6];
        for r in model.relationships() {
            counts[r.kind as usize] += 1;
            out.push_str(&format!("  {r}\n"));
        }
        let kinds = [
            RelationshipKind::Inheritance,
            RelationshipKind::Realization,
            RelationshipKind::Composition,
            RelationshipKind::Aggregation,
            RelationshipKind::Association,
            RelationshipKind::Dependency,
        ];
        out.push_str("\n  By kind:\n");
        for kind in kinds {
            let count = counts[kind as usize];
            if count > 0 {
                out.push_str(&format!("    {kind}: {count}\n"));
            }
        }
    }

    let cycles = ClassGraph::from_model(model).ownership_cycles();
    if !cycles.is_empty() {
        out.push_str(&format!(
            "\n{} ({} found)\n{}\n",
            "Ownership cycles".yellow().bold(),
            cycles.len(),
            "-".repeat(40),
        ));
        for cycle in &cycles {
            out.push_str(&format!(
                "  {} {}\n",
                "WARN".yellow().bold(),
                cycle.join(" <-> ")
            ));
        }
    }

    if !analysis.duplicates.is_empty() {
        out.push_str(&format!("\n{}\n", "Duplicate declarations".yellow().bold()));
        for name in &analysis.duplicates {
            out.push_str(&format!("  {name} (first declaration kept)\n"));
        }
    }

    if analysis.failures.is_empty() {
        out.push_str(&format!("\n{}\n", "All entities classified.".green().bold()));
    } else {
        out.push_str(&format!(
            "\n{} ({} entities)\n",
            "Classification failures".red().bold(),
            analysis.failures.len()
        ));
        for failure in &analysis.failures {
            out.push_str(&format!("  {} {failure}\n", "ERROR".red().bold()));
        }
    }

    out.push('\n');
    out
}
