/// Standard output utilities for consistent command formatting
use arbor_bio::{ClusterNode, DistanceMatrix, Fraction, MergeStep, UpgmaResult};
use arbor_core::{ArborError, ArborResult};
use clap::ValueEnum;
use colored::*;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color as TableColor, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tables and a text dendrogram
    Table,
    /// Full result as JSON
    Json,
    /// Tree in Newick format
    Newick,
}

pub struct DisplayOptions {
    pub decimal_places: u32,
    pub show_steps: bool,
    pub show_matrices: bool,
    pub show_derivations: bool,
}

/// Display a section header with optional underline
pub fn section_header(title: &str) {
    println!("\n{}", title.bold().cyan());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Display a subsection header
pub fn subsection_header(title: &str) {
    println!("\n{} {}", "◆".cyan(), title.bold());
}

/// Display a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Display an info message
pub fn info(message: &str) {
    println!("{} {}", "●".blue(), message);
}

/// Create a standard table with our preferred styling
pub fn create_standard_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Create a standard header cell
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .add_attribute(Attribute::Bold)
        .fg(TableColor::Cyan)
}

/// Exact value, followed by its rounded decimal when it is not a whole number
pub fn format_distance(value: Fraction, places: u32) -> String {
    if value.is_integer() {
        value.to_string()
    } else {
        format!("{} ≈ {:.*}", value, places as usize, value.round_to(places))
    }
}

/// Distance matrix as a table; `highlight` marks the pair about to merge
pub fn matrix_table(matrix: &DistanceMatrix, places: u32, highlight: Option<&(String, String)>) -> Table {
    let mut table = create_standard_table();

    let mut header = vec![header_cell("")];
    header.extend(matrix.labels().iter().map(|label| header_cell(label)));
    table.set_header(header);

    for (i, (label, row)) in matrix.rows().enumerate() {
        let mut cells = vec![Cell::new(label).add_attribute(Attribute::Bold)];
        for (j, value) in row.iter().enumerate() {
            let text = match value {
                Some(d) => format_distance(*d, places),
                None => "-".to_string(),
            };
            let mut cell = Cell::new(text).set_alignment(CellAlignment::Right);
            let marked = highlight.map_or(false, |(a, b)| {
                let (row_label, col_label) = (label, matrix.label(j));
                (row_label == a && col_label == b) || (row_label == b && col_label == a)
            });
            if marked {
                cell = cell.fg(TableColor::Yellow).add_attribute(Attribute::Bold);
            } else if i == j {
                cell = cell.fg(TableColor::DarkGrey);
            }
            cells.push(cell);
        }
        table.add_row(cells);
    }

    table
}

pub fn print_step(step: &MergeStep, options: &DisplayOptions) {
    let places = options.decimal_places;
    subsection_header(&format!("Step {}: {}", step.step_number, step.description()));

    if options.show_matrices {
        println!("{}", matrix_table(&step.matrix, places, Some(&step.merged)));
    }

    info(&format!(
        "New cluster {} with {} leaves at height {}",
        step.new_cluster,
        step.new_size,
        format_distance(step.height, places)
    ));

    if options.show_derivations && !step.derivations.is_empty() {
        let mut table = create_standard_table();
        table.set_header(vec![
            header_cell("Taxon"),
            header_cell(&format!("Distance to {}", step.new_cluster)),
            header_cell("Result"),
        ]);
        for derivation in &step.derivations {
            table.add_row(vec![
                Cell::new(&derivation.taxon),
                Cell::new(derivation),
                Cell::new(format_distance(derivation.result, places)).set_alignment(CellAlignment::Right),
            ]);
        }
        println!("{}", table);
    }
}

/// Text dendrogram, one line per node with its height
pub fn print_tree(tree: &ClusterNode, places: u32) {
    println!("{}", node_label(tree, places));
    print_children(tree, "", places);
}

fn node_label(node: &ClusterNode, places: u32) -> String {
    if node.is_leaf() {
        node.name().green().to_string()
    } else {
        format!(
            "{} {}",
            "●".cyan(),
            format!("height {}", format_distance(node.height(), places)).dimmed()
        )
    }
}

fn print_children(node: &ClusterNode, prefix: &str, places: u32) {
    if let Some((left, right)) = node.children() {
        for (i, child) in [left, right].into_iter().enumerate() {
            let is_last = i == 1;
            let connector = if is_last { "└─" } else { "├─" };
            println!("{}{} {}", prefix, connector.dimmed(), node_label(child, places));

            let child_prefix = if is_last {
                format!("{}   ", prefix)
            } else {
                format!("{}│  ", prefix)
            };
            print_children(child, &child_prefix, places);
        }
    }
}

/// Full table report: input, every merge step, tree, branch lengths
pub fn print_upgma(matrix: &DistanceMatrix, result: &UpgmaResult, options: &DisplayOptions) -> ArborResult<()> {
    let places = options.decimal_places;

    section_header("Input");
    info(&format!("{} taxa: {}", matrix.len(), matrix.labels().join(", ")));

    if options.show_steps {
        section_header("Merge steps");
        for step in &result.steps {
            print_step(step, options);
        }
    }

    section_header("Tree");
    print_tree(&result.tree, places);

    let mut edges = create_standard_table();
    edges.set_header(vec![header_cell("Parent"), header_cell("Child"), header_cell("Branch length")]);
    for edge in result.tree.edges()? {
        edges.add_row(vec![
            Cell::new(&edge.parent),
            Cell::new(&edge.child),
            Cell::new(format_distance(edge.length, places)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{}", edges);

    info(&format!("Leaf order: {}", result.leaf_order().join(", ")));
    info(&format!("Newick: {}", result.tree.to_newick()));
    success(&format!(
        "Clustered {} taxa in {} merge steps",
        matrix.len(),
        result.steps.len()
    ));

    Ok(())
}

/// Pretty-printed JSON for any serializable result
pub fn render_json<T: Serialize>(value: &T) -> ArborResult<String> {
    serde_json::to_string_pretty(value).map_err(ArborError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(Fraction::from(7u64), 2), "7");
        assert_eq!(
            format_distance(Fraction::new(37, 3).unwrap(), 2),
            "37/3 ≈ 12.33"
        );
        assert_eq!(format_distance(Fraction::new(1, 2).unwrap(), 0), "1/2 ≈ 1");
    }

    #[test]
    fn test_output_format_parses_config_strings() {
        assert_eq!(
            <OutputFormat as ValueEnum>::from_str("NEWICK", true),
            Ok(OutputFormat::Newick)
        );
        assert!(<OutputFormat as ValueEnum>::from_str("svg", true).is_err());
    }

    #[test]
    fn test_matrix_table_lists_labels() {
        let matrix = DistanceMatrix::from_pairs(
            vec!["a".into(), "b".into()],
            vec![("a", "b", Fraction::new(5, 2).unwrap())],
        )
        .unwrap();
        let rendered = matrix_table(&matrix, 1, None).to_string();

        assert!(rendered.contains('a'));
        assert!(rendered.contains("5/2 ≈ 2.5"));
    }
}
