//! Artifact bundle inspection

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Table};
use console::style;

use crate::pipeline::{ArtifactBundle, CategoricalField, Classifier, Model, NUMERIC_COLUMNS};

fn print_table(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn section(title: &str) {
    println!();
    println!("    {}", style(title).white().bold());
}

/// Print column order, encoder vocabularies, scaler parameters and model shape
pub fn display_artifacts(bundle: &ArtifactBundle) {
    let model = bundle.model();

    section("Model");
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.add_row(vec![Cell::new("Kind"), Cell::new(model.kind())]);
    table.add_row(vec![Cell::new("Features"), Cell::new(model.n_features())]);
    table.add_row(vec![
        Cell::new("Classes"),
        Cell::new(format!("{:?}", model.classes())),
    ]);
    if let Model::RandomForest(rf) = model {
        let nodes: usize = rf.trees.iter().map(|t| t.node_count()).sum();
        table.add_row(vec![Cell::new("Trees"), Cell::new(rf.trees.len())]);
        table.add_row(vec![Cell::new("Total nodes"), Cell::new(nodes)]);
    }
    print_table(&table);

    section("Feature columns (model input order)");
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Column").add_attribute(Attribute::Bold),
    ]);
    for (i, column) in bundle.columns().columns().iter().enumerate() {
        table.add_row(vec![Cell::new(i), Cell::new(column)]);
    }
    print_table(&table);

    section(&format!("Scaler ({})", bundle.scaler().kind()));
    let (offset, scale) = bundle.scaler().parameters();
    let offset_label = match bundle.scaler().kind() {
        "standard" => "Mean",
        _ => "Min",
    };
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Input").add_attribute(Attribute::Bold),
        Cell::new(offset_label).add_attribute(Attribute::Bold),
        Cell::new("Scale").add_attribute(Attribute::Bold),
    ]);
    for ((name, o), s) in NUMERIC_COLUMNS.iter().zip(offset).zip(scale) {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{:.4}", o)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.6}", s)).set_alignment(CellAlignment::Right),
        ]);
    }
    print_table(&table);

    section("Encoders");
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Field").add_attribute(Attribute::Bold),
        Cell::new("Vocabulary (code: label)").add_attribute(Attribute::Bold),
    ]);
    for field in CategoricalField::ALL {
        let vocabulary = bundle
            .encoders()
            .get(field)
            .classes()
            .iter()
            .enumerate()
            .map(|(code, label)| format!("{}: {}", code, label))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![Cell::new(field.to_string()), Cell::new(vocabulary)]);
    }
    print_table(&table);
}
