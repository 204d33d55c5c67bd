//! Renders the A4 PDF expense report.
//!
//! The document has an optional logo, a title, a line identifying the user
//! and when the report was made, a summary table and a detail table with one
//! row per expense. The detail table continues over as many pages as needed
//! and ends with a total row.

use std::{ops::Range, path::Path};

use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point,
    image_crate,
};
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error, currency::CurrencyFormat, expense::Expense, report::aggregation::summarize,
};

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);

const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 195.0;
const MARGIN_TOP: f32 = 282.0;
const MARGIN_BOTTOM: f32 = 20.0;

const ROW_HEIGHT: f32 = 7.0;
const LOGO_HEIGHT: f32 = 20.0;
const LOGO_DPI: f32 = 300.0;
const MAX_DESCRIPTION_CHARS: usize = 40;

/// x offsets of the Date, Category, Description and Amount columns.
const DETAIL_COLUMNS: [f32; 4] = [MARGIN_LEFT, 45.0, 85.0, 165.0];
const SUMMARY_COLUMNS: [f32; 2] = [MARGIN_LEFT, 85.0];

const GENERATED_AT_FORMAT: &[BorrowedFormatItem] =
    format_description!("[day]/[month]/[year] [hour]:[minute]");
const PERIOD_FORMAT: &[BorrowedFormatItem] = format_description!("[month repr:long] [year]");
const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[day]/[month]/[year]");

/// Everything that goes into one PDF report.
#[derive(Debug)]
pub struct ReportDocument<'a> {
    pub user_name: &'a str,
    pub user_email: &'a str,
    /// When the report was requested, in the local timezone.
    pub generated_at: OffsetDateTime,
    pub expenses: &'a [Expense],
    /// An image to draw above the title.
    pub logo_path: Option<&'a Path>,
    pub currency: &'a CurrencyFormat,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Render `report` as an A4 PDF.
///
/// # Errors
/// Returns [Error::NothingToExport] if the report has no expenses, or
/// [Error::PdfError] if the document could not be written.
pub fn render_pdf(report: &ReportDocument<'_>) -> Result<Vec<u8>, Error> {
    if report.expenses.is_empty() {
        return Err(Error::NothingToExport);
    }

    let (document, page, layer) =
        PdfDocument::new("Expense Report", PAGE_WIDTH, PAGE_HEIGHT, "Report");
    let fonts = Fonts {
        regular: document
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?,
        bold: document
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?,
    };

    let first_layer = document.get_page(page).get_layer(layer);
    let table_top = draw_header(&first_layer, &fonts, report)?;

    let detail_rows = detail_rows(report.expenses, report.currency);
    let pages = plan_pages(
        detail_rows.len() + 1,
        rows_that_fit(table_top),
        rows_that_fit(MARGIN_TOP),
    );
    let last_page = pages.len() - 1;

    for (page_number, rows) in pages.into_iter().enumerate() {
        let (layer, top) = if page_number == 0 {
            (first_layer.clone(), table_top)
        } else {
            (new_page(&document, page_number), MARGIN_TOP)
        };

        let mut y = draw_row(
            &layer,
            &fonts.bold,
            top,
            &DETAIL_COLUMNS,
            &["Date", "Category", "Description", "Amount"],
        );

        let end = rows.end.min(detail_rows.len());
        for row in &detail_rows[rows.start.min(end)..end] {
            let cells = [
                row[0].as_str(),
                row[1].as_str(),
                row[2].as_str(),
                row[3].as_str(),
            ];
            y = draw_row(&layer, &fonts.regular, y, &DETAIL_COLUMNS, &cells);
        }

        if page_number == last_page {
            let total = report.currency.format(summarize(report.expenses).grand_total);
            draw_row(
                &layer,
                &fonts.bold,
                y,
                &DETAIL_COLUMNS,
                &["Total", "", "", total.as_str()],
            );
        }
    }

    document.save_to_bytes().map_err(pdf_error)
}

/// Split `row_count` table rows over pages. The first page has room for
/// `first_page_capacity` rows and every later page for `page_capacity`.
///
/// There is always at least one page.
pub fn plan_pages(
    row_count: usize,
    first_page_capacity: usize,
    page_capacity: usize,
) -> Vec<Range<usize>> {
    let first_page_capacity = first_page_capacity.max(1);
    let page_capacity = page_capacity.max(1);

    let mut pages = vec![0..row_count.min(first_page_capacity)];
    let mut start = pages[0].end;

    while start < row_count {
        let end = (start + page_capacity).min(row_count);
        pages.push(start..end);
        start = end;
    }

    pages
}

/// The number of body rows that fit below a header row starting at `top`.
fn rows_that_fit(top: f32) -> usize {
    let rows = ((top - MARGIN_BOTTOM) / ROW_HEIGHT).floor() as usize;

    rows.saturating_sub(1)
}

fn new_page(document: &PdfDocumentReference, page_number: usize) -> PdfLayerReference {
    let (page, layer) = document.add_page(
        PAGE_WIDTH,
        PAGE_HEIGHT,
        format!("Report page {}", page_number + 1),
    );

    document.get_page(page).get_layer(layer)
}

/// Draw the logo, title, user line and summary table. Returns where the
/// detail table starts.
fn draw_header(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    report: &ReportDocument<'_>,
) -> Result<f32, Error> {
    let mut y = MARGIN_TOP;

    if let Some(logo_path) = report.logo_path {
        match load_logo(logo_path) {
            Ok(logo) => {
                y -= LOGO_HEIGHT;
                draw_logo(layer, logo, y);
                y -= 6.0;
            }
            Err(error) => {
                tracing::warn!(
                    "Could not load the logo {}, using a text title instead: {error}",
                    logo_path.display()
                );
            }
        }
    }

    y -= 8.0;
    layer.use_text("Expense Report", 20.0, Mm(MARGIN_LEFT), Mm(y), &fonts.bold);

    let generated_at = report
        .generated_at
        .format(GENERATED_AT_FORMAT)
        .map_err(|error| Error::PdfError(error.to_string()))?;
    y -= 9.0;
    layer.use_text(
        format!("User: {} ({})", report.user_name, report.user_email),
        11.0,
        Mm(MARGIN_LEFT),
        Mm(y),
        &fonts.regular,
    );
    y -= 6.0;
    layer.use_text(
        format!("Generated: {generated_at}"),
        11.0,
        Mm(MARGIN_LEFT),
        Mm(y),
        &fonts.regular,
    );

    let summary = summarize(report.expenses);
    let top_category = summary
        .top_category()
        .map(|category_total| category_total.category.clone())
        .unwrap_or_else(|| "-".to_owned());
    let period = report
        .generated_at
        .format(PERIOD_FORMAT)
        .map_err(|error| Error::PdfError(error.to_string()))?;

    y -= 12.0;
    layer.use_text("Summary", 14.0, Mm(MARGIN_LEFT), Mm(y), &fonts.bold);
    y -= 3.0;

    let summary_rows = [
        ["Total spent".to_owned(), report.currency.format(summary.grand_total)],
        [
            "Average per category".to_owned(),
            report.currency.format(summary.average_per_category()),
        ],
        ["Top category".to_owned(), top_category],
        ["Period".to_owned(), period],
    ];
    for [label, value] in &summary_rows {
        y = draw_row(
            layer,
            &fonts.regular,
            y,
            &SUMMARY_COLUMNS,
            &[label.as_str(), value.as_str()],
        );
    }

    y -= 10.0;
    layer.use_text("Expenses", 14.0, Mm(MARGIN_LEFT), Mm(y), &fonts.bold);

    Ok(y - 3.0)
}

fn load_logo(path: &Path) -> Result<image_crate::DynamicImage, image_crate::ImageError> {
    image_crate::open(path)
}

/// Draw `logo` with its bottom edge at `y`, scaled to [LOGO_HEIGHT].
fn draw_logo(layer: &PdfLayerReference, logo: image_crate::DynamicImage, y: f32) {
    let natural_height = logo.height().max(1) as f32 / LOGO_DPI * 25.4;
    let scale = LOGO_HEIGHT / natural_height;

    Image::from_dynamic_image(&logo).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN_LEFT)),
            translate_y: Some(Mm(y)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(LOGO_DPI),
            ..Default::default()
        },
    );
}

/// Draw one table row below `top` with a rule underneath. Returns the top of
/// the next row.
fn draw_row(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    top: f32,
    columns: &[f32],
    cells: &[&str],
) -> f32 {
    let baseline = top - ROW_HEIGHT + 2.0;

    for (x, cell) in columns.iter().zip(cells) {
        layer.use_text(*cell, 10.0, Mm(*x), Mm(baseline), font);
    }

    let bottom = top - ROW_HEIGHT;
    layer.set_outline_thickness(0.3);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN_LEFT), Mm(bottom)), false),
            (Point::new(Mm(MARGIN_RIGHT), Mm(bottom)), false),
        ],
        is_closed: false,
    });

    bottom
}

/// The Date, Category, Description and Amount cells for each expense.
fn detail_rows(expenses: &[Expense], currency: &CurrencyFormat) -> Vec<[String; 4]> {
    expenses
        .iter()
        .map(|expense| {
            [
                expense
                    .date
                    .format(DATE_FORMAT)
                    .unwrap_or_else(|_| expense.date.to_string()),
                truncate(&expense.category, 20),
                truncate(&expense.description, MAX_DESCRIPTION_CHARS),
                currency.format(expense.amount),
            ]
        })
        .collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let mut truncated: String = text.chars().take(max_chars - 3).collect();
    truncated.push_str("...");
    truncated
}

fn pdf_error(error: printpdf::Error) -> Error {
    tracing::error!("Could not render PDF: {error}");
    Error::PdfError(error.to_string())
}

#[cfg(test)]
mod tests {
    use printpdf::image_crate::RgbImage;
    use time::macros::{date, datetime};

    use crate::{Error, currency::CurrencyFormat, expense::Expense, test_utils::assert_is_pdf};

    use super::{ReportDocument, plan_pages, render_pdf, truncate};

    fn expenses(count: i64) -> Vec<Expense> {
        (1..=count)
            .map(|id| {
                Expense::build(id as f64, date!(2024 - 03 - 01), "food", "groceries").finalize(id)
            })
            .collect()
    }

    fn report<'a>(expenses: &'a [Expense], currency: &'a CurrencyFormat) -> ReportDocument<'a> {
        ReportDocument {
            user_name: "Eva",
            user_email: "eva@example.com",
            generated_at: datetime!(2026 - 10 - 19 14:30 -3),
            expenses,
            logo_path: None,
            currency,
        }
    }

    #[test]
    fn empty_report_is_nothing_to_export() {
        let currency = CurrencyFormat::default();

        assert_eq!(
            render_pdf(&report(&[], &currency)),
            Err(Error::NothingToExport)
        );
    }

    #[test]
    fn renders_pdf_bytes() {
        let currency = CurrencyFormat::default();
        let expenses = expenses(3);

        let bytes = render_pdf(&report(&expenses, &currency)).unwrap();

        assert_is_pdf(&bytes);
    }

    #[test]
    fn long_reports_span_pages() {
        let currency = CurrencyFormat::default();
        let short = expenses(3);
        let long = expenses(200);

        let short_bytes = render_pdf(&report(&short, &currency)).unwrap();
        let long_bytes = render_pdf(&report(&long, &currency)).unwrap();

        assert_is_pdf(&long_bytes);
        assert!(long_bytes.len() > short_bytes.len());
    }

    #[test]
    fn missing_logo_falls_back_to_text_title() {
        let currency = CurrencyFormat::default();
        let expenses = expenses(1);
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");

        let document = ReportDocument {
            logo_path: Some(&missing),
            ..report(&expenses, &currency)
        };

        assert_is_pdf(&render_pdf(&document).unwrap());
    }

    #[test]
    fn draws_logo_when_present() {
        let currency = CurrencyFormat::default();
        let expenses = expenses(1);
        let dir = tempfile::tempdir().unwrap();
        let logo_path = dir.path().join("logo.png");
        RgbImage::new(8, 4).save(&logo_path).unwrap();

        let with_logo = render_pdf(&ReportDocument {
            logo_path: Some(&logo_path),
            ..report(&expenses, &currency)
        })
        .unwrap();
        let without_logo = render_pdf(&report(&expenses, &currency)).unwrap();

        assert!(with_logo.len() > without_logo.len());
    }

    #[test]
    fn plan_pages_fills_first_page_then_the_rest() {
        assert_eq!(plan_pages(3, 10, 30), vec![0..3]);
        assert_eq!(plan_pages(10, 10, 30), vec![0..10]);
        assert_eq!(plan_pages(11, 10, 30), vec![0..10, 10..11]);
        assert_eq!(plan_pages(75, 10, 30), vec![0..10, 10..40, 40..70, 70..75]);
    }

    #[test]
    fn plan_pages_always_has_a_page() {
        assert_eq!(plan_pages(0, 10, 30), vec![0..0]);
        assert_eq!(plan_pages(2, 0, 0), vec![0..1, 1..2]);
    }

    #[test]
    fn truncate_long_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long description", 10), "a very ...");
    }
}
