use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tdoc::{Document, Paragraph, ParagraphType, Span};

use super::*;

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new_text().with_content(vec![Span::new_text(text)])
}

fn sample_root() -> ContentRoot {
    let document = Document::new().with_paragraphs(vec![
        Paragraph::new(ParagraphType::Header1).with_content(vec![Span::new_text("About me")]),
        text_paragraph("I write software and lift heavy things."),
        Paragraph::new_unordered_list().with_entries(vec![
            vec![text_paragraph("Rust")],
            vec![text_paragraph("TypeScript and a long tail of other languages")],
        ]),
        Paragraph::new(ParagraphType::CodeBlock)
            .with_content(vec![Span::new_text("fn main() {\n    println!(\"hi\");\n}")]),
        text_paragraph("The end."),
    ]);
    ContentRoot::from_document(&document)
}

fn assert_single_valid_cursor(navigator: &Navigator) {
    let root = navigator.root().unwrap();
    let cursor = navigator.cursor().expect("cursor must exist");
    let segment = root.segment(cursor.segment).expect("cursor segment exists");
    assert!(cursor.offset < segment.len(), "offset {} out of {}", cursor.offset, segment.len());
    assert_eq!(navigator.active_container(), Some(segment.container()));
}

#[test]
fn new_root_places_cursor_on_first_meaningful_segment() {
    let root = ContentRoot::builder()
        .container(ContainerKind::Text)
        .segment("   ")
        .container(ContainerKind::Text)
        .segment("hello")
        .build();
    let navigator = Navigator::with_root(root);
    let cursor = navigator.cursor().unwrap();
    assert_eq!(cursor.segment.index(), 1);
    assert_eq!(cursor.offset, 0);
    assert_eq!(navigator.active_container().map(ContainerId::index), Some(1));
}

#[test]
fn empty_root_has_no_cursor() {
    let mut navigator = Navigator::with_root(ContentRoot::default());
    assert_eq!(navigator.cursor(), None);
    navigator.move_right();
    assert_eq!(navigator.last_failure(), Some(&NavigationError::NoCursor));
    assert_eq!(navigator.cursor(), None);
}

#[test]
fn motions_without_root_report_missing_root() {
    let mut navigator = Navigator::new();
    assert_eq!(navigator.apply(Motion::Down), Err(NavigationError::MissingRoot));
    assert_eq!(navigator.wrapped_line_count(), 1);
}

#[test]
fn apply_offset_round_trips_through_context() {
    let mut navigator = Navigator::with_root(sample_root());
    let merged = navigator.local_context().unwrap().merged().to_string();
    for offset in 0..merged.chars().count() {
        navigator.apply_offset(Target::within(offset)).unwrap();
        let context = navigator.local_context().unwrap();
        assert_eq!(context.merged(), merged);
        assert_eq!(context.offset, offset);
    }
}

#[test]
fn apply_offset_rejects_positions_past_the_end() {
    let mut navigator = Navigator::with_root(sample_root());
    let before = navigator.cursor();
    let err = navigator.apply_offset(Target::within(100)).unwrap_err();
    assert!(matches!(err, NavigationError::OffsetOutOfRange { offset: 100, .. }));
    assert_eq!(navigator.cursor(), before);

    let err = navigator
        .apply_offset(Target::cross(SegmentId::new(500), 0))
        .unwrap_err();
    assert_eq!(err, NavigationError::UnknownSegment(SegmentId::new(500)));
    assert_eq!(navigator.cursor(), before);
}

#[test]
fn cross_segment_move_updates_active_container() {
    let mut navigator = Navigator::with_root(sample_root());
    let first = navigator.active_container();
    navigator.move_down();
    assert_ne!(navigator.active_container(), first);
    assert_single_valid_cursor(&navigator);
}

#[test]
fn first_char_is_idempotent() {
    let mut navigator = Navigator::with_root(sample_root());
    navigator.move_down();
    navigator.move_word_forward();
    navigator.move_to_first_char();
    assert_eq!(navigator.cursor().unwrap().offset, 0);
    navigator.move_to_first_char();
    assert_eq!(navigator.cursor().unwrap().offset, 0);
}

#[test]
fn document_bounds_report_start_and_end() {
    let mut navigator = Navigator::with_root(sample_root());
    navigator.move_left();
    assert_eq!(
        navigator.last_failure().and_then(NavigationError::boundary),
        Some(Boundary::Start)
    );

    navigator.move_to_last_text_node();
    navigator.move_to_last_char();
    assert_eq!(navigator.local_context().unwrap().merged(), "The end.");
    navigator.move_right();
    assert_eq!(
        navigator.last_failure().and_then(NavigationError::boundary),
        Some(Boundary::End)
    );
}

#[test]
fn successful_motion_clears_last_failure() {
    let mut navigator = Navigator::with_root(sample_root());
    navigator.move_left();
    assert!(navigator.last_failure().is_some());
    navigator.move_right();
    assert_eq!(navigator.last_failure(), None);
}

#[test]
fn document_jumps_visit_both_ends() {
    let mut navigator = Navigator::with_root(sample_root());
    navigator.move_to_last_text_node();
    assert_eq!(navigator.local_context().unwrap().merged(), "The end.");
    navigator.move_to_first_text_node();
    assert_eq!(navigator.local_context().unwrap().merged(), "About me");
    assert_eq!(navigator.cursor().unwrap().offset, 0);
    navigator.move_to_first_text_node();
    assert_eq!(
        navigator.last_failure().and_then(NavigationError::boundary),
        Some(Boundary::Start)
    );
}

#[test]
fn replace_root_resets_the_cursor() {
    let mut navigator = Navigator::with_root(sample_root());
    navigator.move_to_last_text_node();
    navigator.replace_root(ContentRoot::builder().segment("fresh page").build());
    assert_eq!(navigator.cursor(), Some(Position::new(SegmentId::new(0), 0)));
    assert_eq!(navigator.last_failure(), None);
}

#[test]
fn wrapped_line_count_tracks_measure() {
    let mut navigator = Navigator::with_root(
        ContentRoot::builder()
            .segment("a few words that wrap on narrow screens")
            .build(),
    );
    navigator.set_measure(Measure::cells(80));
    assert_eq!(navigator.wrapped_line_count(), 1);
    navigator.set_measure(Measure::cells(10));
    assert!(navigator.wrapped_line_count() > 1);
}

#[test]
fn random_motion_sequences_keep_one_valid_cursor() {
    for seed in 0..16 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut navigator = Navigator::with_root(sample_root());
        navigator.set_measure(Measure::cells(rng.gen_range(8..60)));
        for _ in 0..300 {
            let motion = Motion::ALL[rng.gen_range(0..Motion::ALL.len())];
            let before = navigator.cursor();
            match navigator.apply(motion) {
                Ok(position) => assert_eq!(navigator.cursor(), Some(position)),
                Err(err) => {
                    assert!(err.boundary().is_some(), "{motion:?} failed with {err}");
                    assert_eq!(navigator.cursor(), before);
                }
            }
            assert_single_valid_cursor(&navigator);
        }
    }
}
