use readaloud::app::{App, AppEvent};
use readaloud::document::{ContentRegion, ContentTree, RegionId, RenderSurface};
use readaloud::engine::config::EngineKind;
use readaloud::engine::Config;
use readaloud::input::text::TextDocument;
use readaloud::input::{Document, Pager};
use readaloud::reading::highlight::active_markers;
use readaloud::reading::{segment, HighlightOutcome, HighlightTracker};
use readaloud::speech::{
    PacedEngine, PlaybackEvent, PlaybackState, SpeechDriver, VoiceSettings,
};
use readaloud::reading::Pacing;
use std::fs;
use std::time::{Duration, Instant};

fn surface_from(pages: &[&str]) -> RenderSurface {
    let regions = pages
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let mut tree = ContentTree::new();
            let p = tree.append_element(tree.root(), "p");
            tree.append_text(p, text);
            ContentRegion::new(RegionId(i), format!("Page {}", i + 1), tree)
        })
        .collect();
    let mut surface = RenderSurface::new();
    surface.replace_regions(regions);
    surface
}

fn word(text: &str) -> PlaybackEvent {
    PlaybackEvent::new(text, 0, text.chars().count())
}

#[test]
fn repeated_word_highlights_next_occurrence() {
    let mut surface = surface_from(&["the cat sat on the mat"]);
    let seg = segment(&mut surface);
    assert_eq!(seg.tokens.len(), 6);
    assert_eq!(seg.full_text, "the cat sat on the mat");

    let mut tracker = HighlightTracker::new();
    let outcomes: Vec<HighlightOutcome> = ["the", "cat", "the", "mat"]
        .iter()
        .map(|w| tracker.on_playback_event(&word(w), &mut surface))
        .collect();

    assert_eq!(
        outcomes,
        vec![
            HighlightOutcome::Highlighted(0),
            HighlightOutcome::Highlighted(1),
            HighlightOutcome::Highlighted(4),
            HighlightOutcome::Highlighted(5),
        ]
    );

    assert_eq!(
        tracker.on_playback_event(&PlaybackEvent::clear(), &mut surface),
        HighlightOutcome::Cleared
    );
    assert_eq!(tracker.state().last_highlighted_index(), None);
    assert!(active_markers(&surface).is_empty());
}

#[test]
fn unknown_word_leaves_highlight_alone() {
    let mut surface = surface_from(&["one two three"]);
    segment(&mut surface);
    let mut tracker = HighlightTracker::new();
    tracker.on_playback_event(&word("two"), &mut surface);

    let outcome = tracker.on_playback_event(&word("seventeen"), &mut surface);

    assert_eq!(outcome, HighlightOutcome::NoMatch);
    assert_eq!(tracker.state().last_highlighted_index(), Some(1));
    let active = active_markers(&surface);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].index, 1);
}

#[test]
fn stop_mid_utterance_clears_highlight() {
    let mut surface = surface_from(&["alpha beta gamma delta"]);
    let seg = segment(&mut surface);
    let engine = PacedEngine::new(Pacing {
        wpm: 600,
        ..Pacing::default()
    });
    let mut driver = SpeechDriver::new(engine, seg.full_text, VoiceSettings::default());
    let mut tracker = HighlightTracker::new();

    let t0 = Instant::now();
    driver.play(t0).unwrap();
    driver.tick(t0 + Duration::from_millis(150));
    for event in driver.drain_events() {
        tracker.on_playback_event(&event, &mut surface);
    }
    assert_eq!(tracker.state().last_highlighted_index(), Some(1));

    driver.stop().unwrap();
    let events = driver.drain_events();
    assert_eq!(events, vec![PlaybackEvent::clear()]);
    for event in &events {
        tracker.on_playback_event(event, &mut surface);
    }

    assert_eq!(driver.state(), PlaybackState::Idle);
    assert_eq!(tracker.state().last_highlighted_index(), None);
    assert!(active_markers(&surface).is_empty());
}

#[test]
fn rebuilt_page_is_indexed_from_zero() {
    let doc = TextDocument::from_text("book", "the cat sat on the mat\nthe dog ran", 1).unwrap();
    let mut pager = Pager::new(1);
    let mut surface = RenderSurface::new();
    pager.render(&doc, &mut surface);
    segment(&mut surface);

    let mut tracker = HighlightTracker::new();
    for w in ["the", "cat", "sat", "on", "the"] {
        tracker.on_playback_event(&word(w), &mut surface);
    }
    assert_eq!(tracker.state().last_highlighted_index(), Some(4));

    assert!(pager.next(&doc));
    pager.render(&doc, &mut surface);
    tracker.reset();
    let seg = segment(&mut surface);

    assert_eq!(seg.tokens[0].index, 0);
    assert_eq!(
        tracker.on_playback_event(&word("the"), &mut surface),
        HighlightOutcome::Highlighted(0)
    );
}

#[test]
fn segmenting_twice_keeps_order() {
    let mut surface = surface_from(&["Hello, world!  Two   spaces", "second region"]);
    let first: Vec<String> = segment(&mut surface).tokens.into_iter().map(|t| t.text).collect();
    let second = segment(&mut surface);
    let second_texts: Vec<String> = second.tokens.iter().map(|t| t.text.clone()).collect();

    assert_eq!(first, second_texts);
    let indices: Vec<usize> = second.tokens.iter().map(|t| t.index).collect();
    assert_eq!(indices, (0..first.len()).collect::<Vec<_>>());
}

#[test]
fn highlight_index_never_decreases_during_playback() {
    let text = "a b a c b a d a b c";
    let mut surface = surface_from(&[text]);
    let seg = segment(&mut surface);
    let engine = PacedEngine::new(Pacing {
        wpm: 600,
        ..Pacing::default()
    });
    let mut driver = SpeechDriver::new(engine, seg.full_text, VoiceSettings::default());
    let mut tracker = HighlightTracker::new();

    let t0 = Instant::now();
    driver.play(t0).unwrap();
    let mut last = None;
    for step in 0..12 {
        driver.tick(t0 + Duration::from_millis(step * 100));
        for event in driver.drain_events() {
            tracker.on_playback_event(&event, &mut surface);
            let current = tracker.state().last_highlighted_index();
            if !event.is_clear() {
                assert!(current >= last, "{:?} went back from {:?}", current, last);
                last = current;
            }
            assert!(active_markers(&surface).len() <= 1);
        }
    }
    assert_eq!(last, Some(9));
    assert_eq!(driver.state(), PlaybackState::Idle);
}

#[test]
fn highlight_search_spans_regions_in_order() {
    let mut surface = surface_from(&["left page", "right page"]);
    segment(&mut surface);
    let mut tracker = HighlightTracker::new();

    tracker.on_playback_event(&word("page"), &mut surface);
    assert_eq!(tracker.state().last_highlighted_index(), Some(1));
    tracker.on_playback_event(&word("page"), &mut surface);
    assert_eq!(tracker.state().last_highlighted_index(), Some(3));
    let active = active_markers(&surface);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].location.region, RegionId(1));
}

#[test]
fn isolated_region_is_skipped() {
    let mut surface = surface_from(&["reachable words"]);
    let mut regions: Vec<ContentRegion> = surface.regions().to_vec();
    regions.push(ContentRegion::isolated(RegionId(1), "embedded"));
    surface.replace_regions(regions);

    let seg = segment(&mut surface);
    assert_eq!(seg.full_text, "reachable words");
}

#[test]
fn end_to_end_reading_from_text_file() {
    let test_file = std::env::temp_dir().join("readaloud_e2e.txt");
    fs::write(&test_file, "Hello world! This is a test\nof the read aloud highlighter.").unwrap();

    let mut config = Config::default();
    config.speech.wpm = 600;
    config.speech.engine = EngineKind::Silent;
    config.paging.pages_per_view = 2;
    config.paging.lines_per_page = 1;
    let mut app = App::new(config);

    let t0 = Instant::now();
    app.handle_event_at(
        AppEvent::LoadFile(test_file.to_string_lossy().into_owned()),
        t0,
    );
    fs::remove_file(&test_file).unwrap();

    assert_eq!(app.surface().regions().len(), 2);
    assert_eq!(
        app.spoken_text(),
        "Hello world! This is a test of the read aloud highlighter."
    );

    app.handle_event_at(AppEvent::TogglePlayback, t0);
    app.tick(t0 + Duration::from_millis(10));
    assert_eq!(app.render_state().highlighted, Some(0));

    app.tick(t0 + Duration::from_secs(30));
    assert_eq!(app.playback_state(), PlaybackState::Idle);
    assert_eq!(app.render_state().highlighted, None);
}

#[test]
fn text_document_pages_cover_all_lines() {
    let doc = TextDocument::from_text("t", "a\nb\nc\nd\ne", 2).unwrap();
    assert_eq!(doc.page_count(), 3);
}
