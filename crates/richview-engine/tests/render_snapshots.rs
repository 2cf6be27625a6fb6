use std::fmt::Write;

use richview_engine::{
    ChildrenRenderer, DocumentBuilder, NoDecorations, Point, Range, RenderPass, RenderRequest,
    RenderRow, RowProps, ViewportState, search_decorations,
};

/// Renders a row as one text line per fact, the way a plain-text host might.
struct TextRows;

impl RenderRow for TextRows {
    type Output = Vec<String>;

    fn render_row(&mut self, props: RowProps<'_>) -> Vec<String> {
        let mut lines = Vec::new();
        for decoration in props.decorations {
            let marks: Vec<String> = decoration
                .marks
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            lines.push(format!("  deco {} {}", decoration.range, marks.join(",")));
        }
        if let Some(selection) = props.selection {
            lines.push(format!("  selection {selection}"));
        }
        lines
    }
}

fn format_pass(pass: &RenderPass<Vec<String>>) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "window {}..={} of {}",
        pass.window.first().unwrap_or_default(),
        pass.window.last().unwrap_or_default(),
        pass.total_height
    )
    .unwrap();
    for row in &pass.rows {
        writeln!(
            out,
            "row {} {} slot {} at {}",
            row.index, row.key, row.slot.0, row.offset
        )
        .unwrap();
        for line in &row.output {
            writeln!(out, "{line}").unwrap();
        }
    }
    out.trim_end().to_string()
}

#[test]
fn search_window() {
    let doc = DocumentBuilder::new()
        .heading("Intro")
        .paragraph("the quick fox")
        .paragraph("a quick brown dog")
        .paragraph("nothing here")
        .heading("Outro")
        .build();
    let matches = search_decorations(&doc, "quick");
    let selection = Range::new(Point::new(vec![1, 0], 4), Point::new(vec![2, 0], 1));
    let request = RenderRequest::for_parent(&doc, doc.root(), ViewportState::new(60.0, 120.0, 60.0))
        .with_decorations(&matches)
        .with_selection(Some(&selection));

    let pass = ChildrenRenderer::new()
        .render(&doc, &request, &NoDecorations, &mut TextRows)
        .unwrap();

    insta::assert_snapshot!("search_window", format_pass(&pass));
}
