//! Spreadsheet fixtures built in memory with rust_xlsxwriter

use rust_xlsxwriter::Workbook;

pub const YEARS: [&str; 6] = ["2019", "2020", "2021", "2022", "2023", "2024"];

#[derive(Debug, Clone)]
pub enum FixtureCell {
    Text(&'static str),
    Number(f64),
    Empty,
}

/// Rows of the canonical balance sheet, one value per year in [`YEARS`]
pub fn canonical_rows() -> Vec<(&'static str, [f64; 6])> {
    vec![
        ("ATIVO CIRCULANTE", [100.0, 120.0, 150.0, 160.0, 170.0, 180.0]),
        ("ESTOQUES", [20.0, 25.0, 30.0, 35.0, 40.0, 45.0]),
        ("PASSIVO CIRCULANTE", [50.0, 0.0, 75.0, 80.0, 85.0, 90.0]),
        ("LUCRO LÍQUIDO", [30.0, 45.0, 50.0, 55.0, 60.0, 65.0]),
        ("PATRIMÔNIO LÍQUIDO", [300.0, 150.0, 500.0, 550.0, 600.0, 650.0]),
        ("EBITDA", [80.0, 90.0, 100.0, 110.0, 120.0, 130.0]),
        ("RECEITA LÍQUIDA", [400.0, 360.0, 500.0, 550.0, 600.0, 650.0]),
    ]
}

/// Workbook whose first sheet has the canonical `Descrição | 2019..2024` header
pub fn balance_sheet_xlsx(rows: &[(&str, [f64; 6])]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Balanço").expect("sheet name");
        sheet.write_string(0, 0, "Descrição").expect("header");
        for (c, year) in YEARS.iter().enumerate() {
            sheet.write_string(0, (c + 1) as u16, *year).expect("header");
        }
        for (r, (label, values)) in rows.iter().enumerate() {
            let row = (r + 1) as u32;
            sheet.write_string(row, 0, *label).expect("label");
            for (c, value) in values.iter().enumerate() {
                sheet.write_number(row, (c + 1) as u16, *value).expect("value");
            }
        }
    }
    {
        let notes = workbook.add_worksheet();
        notes.set_name("Notas").expect("sheet name");
        notes.write_string(0, 0, "Fonte: demonstrações auditadas").expect("note");
    }
    workbook.save_to_buffer().expect("xlsx buffer")
}

/// Single-sheet workbook from an arbitrary grid
pub fn xlsx_from_grid(grid: &[Vec<FixtureCell>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        for (r, row) in grid.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    FixtureCell::Text(text) => {
                        sheet.write_string(r, c, *text).expect("text cell");
                    }
                    FixtureCell::Number(value) => {
                        sheet.write_number(r, c, *value).expect("number cell");
                    }
                    FixtureCell::Empty => {}
                }
            }
        }
    }
    workbook.save_to_buffer().expect("xlsx buffer")
}

/// One-page PDF with a Helvetica text layer; xref offsets are computed, so poppler reads it cleanly
pub fn text_pdf(line: &str) -> Vec<u8> {
    let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", line);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", content.len(), content),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}
