#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

pub const FONT_SIZE: i64 = 8;
const LEADING: i64 = 10;

/// Left edges of the seven report columns.
pub const COLUMNS: [i64; 7] = [20, 70, 130, 190, 330, 440, 510];

/// A table cell drawn as its own text object; extra lines wrap downward.
#[derive(Debug, Clone)]
pub struct Cell {
    pub x: i64,
    pub y: i64,
    pub lines: Vec<String>,
}

pub fn cell(column: usize, y: i64, text: &str) -> Cell {
    Cell {
        x: COLUMNS[column],
        y,
        lines: text.split('\n').map(str::to_string).collect(),
    }
}

pub fn heading(y: i64) -> Vec<Cell> {
    [
        "Game Date",
        "Game Time",
        "Matchup",
        "Team",
        "Player Name",
        "Current Status",
        "Reason",
    ]
    .iter()
    .enumerate()
    .map(|(column, label)| cell(column, y, label))
    .collect()
}

fn page_operations(cells: &[Cell], page_number: usize, page_count: usize) -> Vec<Operation> {
    let title = Cell {
        x: 20,
        y: 800,
        lines: vec!["Injury Report: 03/10/24 05:30 PM".to_string()],
    };
    let footer = Cell {
        x: 260,
        y: 30,
        lines: vec![format!("Page {page_number} of {page_count}")],
    };

    let mut operations = Vec::new();
    for cell in std::iter::once(&title).chain(cells).chain(std::iter::once(&footer)) {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]));
        operations.push(Operation::new("TL", vec![LEADING.into()]));
        operations.push(Operation::new("Td", vec![cell.x.into(), cell.y.into()]));
        for (index, line) in cell.lines.iter().enumerate() {
            if index > 0 {
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
        }
        operations.push(Operation::new("ET", vec![]));
    }
    operations
}

pub fn build_report_pdf(pages: &[Vec<Cell>]) -> Result<Document, Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut page_ids = Vec::new();
    for (index, cells) in pages.iter().enumerate() {
        let content = Content {
            operations: page_operations(cells, index + 1, pages.len()),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<_>>(),
            "Count" => i64::try_from(page_ids.len())?,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    Ok(doc)
}

pub fn create_report_pdf(path: &Path, pages: &[Vec<Cell>]) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = build_report_pdf(pages)?;
    doc.save(path)?;
    Ok(())
}

pub fn report_pdf_bytes(pages: &[Vec<Cell>]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut doc = build_report_pdf(pages)?;
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}
