use std::time::{Duration, Instant};

use tdoc::{Document, InlineStyle, Paragraph, ParagraphType, Span};
use termfolio::{
    navigator::{ContentRoot, DocumentLayout, Measure, Motion, Navigator, wrapped_line_count},
    render::render_content,
    site::Site,
    theme::Theme,
};

/// Timing of layout, rendering and cursor motions
///
/// Run with: cargo test --release --bench performance -- --nocapture
const SMALL_DOC_PARAGRAPHS: usize = 10;
const MEDIUM_DOC_PARAGRAPHS: usize = 100;
const LARGE_DOC_PARAGRAPHS: usize = 1000;

const ITERATIONS: usize = 100;

const SAMPLE_WORDS: [&str; 24] = [
    "squat", "deadlift", "bench", "press", "row", "pull-up", "dip", "plank", "tofu", "lentils",
    "walnuts", "creatine", "neovim", "kitty", "rust", "tokio", "ratatui", "linux", "ergodox",
    "ryzen", "cardio", "paddle", "HIIT", "basketball",
];

fn create_test_document(num_paragraphs: usize, words_per_para: usize) -> Document {
    let mut doc = Document::new();
    for i in 0..num_paragraphs {
        let paragraph_type = match i % 6 {
            0 => ParagraphType::Header1,
            1 => ParagraphType::Header2,
            4 => ParagraphType::CodeBlock,
            _ => ParagraphType::Text,
        };

        let mut text = String::new();
        for j in 0..words_per_para {
            if j > 0 {
                text.push(' ');
            }
            text.push_str(SAMPLE_WORDS[(i + j) % SAMPLE_WORDS.len()]);
        }
        doc.add_paragraph(Paragraph::new(paragraph_type).with_content(vec![Span::new_text(&text)]));
    }
    doc
}

/// Paragraphs split into several styled spans, so every container holds
/// more than one segment.
fn create_styled_document(num_paragraphs: usize) -> Document {
    let mut doc = Document::new();
    for i in 0..num_paragraphs {
        let paragraph = Paragraph::new_text().with_content(vec![
            Span::new_text(&format!("Paragraph {i} mixes ")),
            Span::new_styled(InlineStyle::Bold).with_text("bold words"),
            Span::new_text(" with "),
            Span::new_styled(InlineStyle::Italic).with_text("italic ones"),
            Span::new_text(" and a trailing sentence that wraps on narrow terminals."),
        ]);
        doc.add_paragraph(paragraph);
    }
    doc
}

struct BenchmarkResult {
    name: String,
    iterations: usize,
    total_duration: Duration,
    avg_duration: Duration,
    min_duration: Duration,
    max_duration: Duration,
}

impl BenchmarkResult {
    fn print(&self) {
        println!("\n{}", "=".repeat(70));
        println!("Benchmark: {}", self.name);
        println!("{}", "=".repeat(70));
        println!("Iterations:     {}", self.iterations);
        println!("Total time:     {:?}", self.total_duration);
        println!("Average:        {:?}", self.avg_duration);
        println!("Min:            {:?}", self.min_duration);
        println!("Max:            {:?}", self.max_duration);

        if self.avg_duration.as_millis() > 16 {
            println!("\nWARNING: average above one frame (16ms)");
        }
    }
}

fn benchmark<F>(name: &str, iterations: usize, mut f: F) -> BenchmarkResult
where
    F: FnMut(),
{
    let mut durations = Vec::with_capacity(iterations);

    for _ in 0..5 {
        f();
    }

    for _ in 0..iterations {
        let start = Instant::now();
        f();
        durations.push(start.elapsed());
    }

    let total_duration: Duration = durations.iter().sum();
    let avg_duration = total_duration / iterations as u32;
    let min_duration = *durations.iter().min().unwrap();
    let max_duration = *durations.iter().max().unwrap();

    BenchmarkResult {
        name: name.to_string(),
        iterations,
        total_duration,
        avg_duration,
        min_duration,
        max_duration,
    }
}

fn sized_roots() -> Vec<(&'static str, ContentRoot)> {
    vec![
        (
            "Small (10 paras)",
            ContentRoot::from_document(&create_test_document(SMALL_DOC_PARAGRAPHS, 30)),
        ),
        (
            "Medium (100 paras)",
            ContentRoot::from_document(&create_test_document(MEDIUM_DOC_PARAGRAPHS, 30)),
        ),
        (
            "Large (1000 paras)",
            ContentRoot::from_document(&create_test_document(LARGE_DOC_PARAGRAPHS, 30)),
        ),
    ]
}

#[test]
fn bench_content_root_from_document() {
    for paragraphs in [SMALL_DOC_PARAGRAPHS, LARGE_DOC_PARAGRAPHS] {
        let doc = create_styled_document(paragraphs);
        let result = benchmark(
            &format!("ContentRoot::from_document - {paragraphs} paras"),
            ITERATIONS,
            || {
                let _ = ContentRoot::from_document(&doc);
            },
        );
        result.print();
    }
}

#[test]
fn bench_layout_and_line_count() {
    for (name, root) in sized_roots() {
        for width in [40, 80, 160] {
            let measure = Measure::cells(width);
            let result = benchmark(
                &format!("wrapped_line_count - {name} @ {width} cols"),
                ITERATIONS,
                || {
                    let _ = wrapped_line_count(&root, measure);
                },
            );
            result.print();
        }
    }
}

#[test]
fn bench_render_content() {
    let theme = Theme::default();
    for (name, root) in sized_roots() {
        let navigator = Navigator::with_root(root);
        let Some(root) = navigator.root() else {
            continue;
        };
        let result = benchmark(&format!("render_content - {name}"), ITERATIONS, || {
            let _ = render_content(
                root,
                Measure::cells(80),
                navigator.cursor(),
                navigator.active_container(),
                &theme,
            );
        });
        result.print();
    }
}

#[test]
fn bench_motions() {
    for (name, root) in sized_roots() {
        for motion in Motion::ALL {
            let mut navigator = Navigator::with_root(root.clone());
            navigator.set_measure(Measure::cells(80));
            let result = benchmark(&format!("{motion:?} - {name}"), ITERATIONS, || {
                if navigator.apply(motion).is_err() {
                    navigator.replace_root(root.clone());
                }
            });
            result.print();
        }
    }
}

#[test]
fn bench_scrolling_down_whole_document() {
    let root = ContentRoot::from_document(&create_styled_document(MEDIUM_DOC_PARAGRAPHS));
    let measure = Measure::cells(60);
    let lines = DocumentLayout::compute(&root, measure).len();
    let result = benchmark("move_down through styled document", 10, || {
        let mut navigator = Navigator::with_root(root.clone());
        navigator.set_measure(measure);
        for _ in 0..lines {
            navigator.move_down();
        }
    });
    result.print();
}

#[test]
fn bench_builtin_site() {
    let result = benchmark("Site::builtin", 20, || {
        let _ = Site::builtin();
    });
    result.print();
}
