mod common;

use std::sync::Arc;

use common::FailingStore;
use docx_markdown::html_dom::HtmlTree;
use docx_markdown::markdown_converter::custom_handlers::SimpleTableRenderer;
use docx_markdown::markdown_converter::html_preprocessing::{
    TableClassification, classify_top_level_tables,
};
use docx_markdown::markdown_converter::markdown_postprocessing::collapse_blank_lines;
use docx_markdown::{EmbeddedImage, ImageSink};
use proptest::prelude::*;

fn cell_text() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn table_rows() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(cell_text(), 1..5), 1..5)
}

fn table_html(rows: &[Vec<String>]) -> String {
    let body: String = rows
        .iter()
        .map(|row| {
            let cells: String = row.iter().map(|c| format!("<td>{c}</td>")).collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();
    format!("<table>{body}</table>")
}

fn classify(html: &str) -> Vec<TableClassification> {
    let tree = HtmlTree::parse_fragment(html).expect("parse");
    classify_top_level_tables(&tree)
        .into_iter()
        .map(|(_, class)| class)
        .collect()
}

const COMPLEX_FEATURES: &[&str] = &[
    r#"<img src="p.png">"#,
    "<ul><li>item</li></ul>",
    "<ol><li>item</li></ol>",
    "<table><tr><td>inner</td></tr></table>",
];

proptest! {
    #[test]
    fn prop_plain_tables_are_simple(rows in table_rows()) {
        prop_assert_eq!(classify(&table_html(&rows)), vec![TableClassification::Simple]);
    }

    #[test]
    fn prop_any_complex_feature_makes_table_complex(
        rows in table_rows(),
        feature in 0..COMPLEX_FEATURES.len() + 2,
        row_pick in any::<prop::sample::Index>(),
        cell_pick in any::<prop::sample::Index>(),
    ) {
        let mut html_rows: Vec<Vec<String>> = rows
            .iter()
            .map(|row| row.iter().map(|c| format!("<td>{c}</td>")).collect())
            .collect();
        let r = row_pick.index(html_rows.len());
        let c = cell_pick.index(html_rows[r].len());
        html_rows[r][c] = match feature {
            i if i < COMPLEX_FEATURES.len() => format!("<td>{}</td>", COMPLEX_FEATURES[i]),
            i if i == COMPLEX_FEATURES.len() => r#"<td colspan="2">x</td>"#.to_string(),
            _ => r#"<td rowspan="3">x</td>"#.to_string(),
        };
        let body: String = html_rows.iter().map(|row| format!("<tr>{}</tr>", row.concat())).collect();

        prop_assert_eq!(
            classify(&format!("<table>{body}</table>")),
            vec![TableClassification::Complex]
        );
    }

    #[test]
    fn prop_rendered_column_count_is_longest_row(rows in table_rows()) {
        let rendered = SimpleTableRenderer::new().render(&table_html(&rows)).expect("render");
        let separator = rendered
            .lines()
            .find(|line| line.starts_with("| -"))
            .expect("separator row");
        let columns = separator.matches(" |").count();
        let longest = rows.iter().map(Vec::len).max().unwrap_or(0);
        prop_assert_eq!(columns, longest);
        prop_assert!(separator.split('|').filter(|s| !s.is_empty()).all(|s| s.trim().len() >= 3));
    }

    #[test]
    fn prop_pipes_are_escaped_and_rows_stay_single_line(
        cells in prop::collection::vec("[a-z|]{1,8}( [a-z|]{1,4})?", 1..4),
        breaks in any::<bool>(),
    ) {
        let row: String = cells
            .iter()
            .map(|c| {
                let c = if breaks { c.replacen(' ', "<br>", 1) } else { c.clone() };
                format!("<td>{c}</td>")
            })
            .collect();
        let rendered = SimpleTableRenderer::new()
            .render(&format!("<table><tr>{row}</tr></table>"))
            .expect("render");
        let lines: Vec<&str> = rendered.lines().filter(|l| !l.is_empty()).collect();

        prop_assert_eq!(lines.len(), 2, "{:?}", rendered);
        for cell in &cells {
            let first_word = cell.split(' ').next().unwrap_or_default();
            prop_assert!(
                lines[0].contains(&first_word.replace('|', "\\|")),
                "{:?} not in {:?}", first_word, lines[0]
            );
        }
        let unescaped_pipes = lines[0]
            .char_indices()
            .filter(|&(i, ch)| ch == '|' && (i == 0 || &lines[0][i - 1..i] != "\\"))
            .count();
        prop_assert_eq!(unescaped_pipes, cells.len() + 1);
    }

    #[test]
    fn prop_blank_line_collapse_is_idempotent(text in "[a \\t\\n]{0,60}") {
        let once = collapse_blank_lines(&text);
        prop_assert_eq!(collapse_blank_lines(&once), once.clone());
        prop_assert!(!once.contains("\n\n\n"));
    }

    #[test]
    fn prop_image_ordinals_are_dense(failures in prop::collection::vec(any::<bool>(), 0..12)) {
        let failing: Vec<usize> = failures
            .iter()
            .enumerate()
            .filter(|(_, fails)| **fails)
            .map(|(i, _)| i + 1)
            .collect();
        let store = Arc::new(FailingStore::failing_on(&failing));
        let mut sink = ImageSink::new(store, "/out/images", "doc");

        for (i, fails) in failures.iter().enumerate() {
            let reference = sink.accept(Ok(EmbeddedImage {
                bytes: vec![1],
                content_type: Some("image/png".into()),
                alt_text: None,
            }));
            if *fails {
                prop_assert!(reference.is_empty());
            } else {
                prop_assert_eq!(reference.reference_path, format!("images/doc-image-{:03}.png", i + 1));
            }
        }
        prop_assert_eq!(sink.image_count(), failures.len());
        prop_assert_eq!(sink.warnings().len(), failing.len());
        for (warning, ordinal) in sink.warnings().iter().zip(&failing) {
            let prefix = format!("Image {ordinal}:");
            prop_assert!(warning.starts_with(&prefix));
        }
    }
}
