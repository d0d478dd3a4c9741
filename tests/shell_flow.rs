//! Shell-level flows on a test backend: visibility-gated activation in the
//! embedded pane, modal open/close teardown, retry, and a scripted
//! end-to-end run against the real flipbook engine.

use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::TestBackend;

use folio::app::{App, run_app_with_event_source};
use folio::engine::EngineReading;
use folio::event_source::ScriptedEventSource;
use folio::history::ReadingHistory;
use folio::library::{DocumentKind, DocumentSource, Library};
use folio::settings::Settings;
use folio::test_utils::{FakeFactory, FakeProbe};
use folio::theme::Palette;
use folio::viewer::shell::{EmbeddedShell, ModalShell, ShellAction};
use folio::viewer::{LoadStatus, ViewerSession};

use std::rc::Rc;

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::empty())
}

fn session(name: &str) -> ViewerSession {
    ViewerSession::new(
        DocumentSource {
            path: PathBuf::from(name),
            kind: DocumentKind::Text,
        },
        name,
    )
}

fn no_observer() -> Box<dyn FnMut(u32)> {
    Box::new(|_| {})
}

fn draw_embedded(terminal: &mut Terminal<TestBackend>, shell: &mut EmbeddedShell) {
    let palette = Palette::default();
    terminal
        .draw(|frame| {
            let area = frame.area();
            shell.render(frame, area, &palette, true);
        })
        .expect("draw");
}

#[test]
fn embedded_shell_defers_construction_until_scrolled_near() {
    let probe = FakeProbe::new();
    let factory = Rc::new(FakeFactory::new(probe.clone()));
    let mut shell = EmbeddedShell::new(1, None);
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).expect("terminal");

    // 40 intro rows push the viewer region far below the 18-row window
    let intro: Vec<String> = (0..40).map(|i| format!("intro line {i}")).collect();
    shell.open_document(session("a.txt"), factory, no_observer(), intro);

    draw_embedded(&mut terminal, &mut shell);
    assert_eq!(probe.builds(), 0);
    assert_eq!(*shell.controller().status(), LoadStatus::NotActivated);

    // scrolling partway down is still out of range
    for _ in 0..10 {
        shell.handle_key(key(KeyCode::Char('j')));
    }
    draw_embedded(&mut terminal, &mut shell);
    assert_eq!(probe.builds(), 0);

    // scroll the rest of the way: the gate fires and the engine is built
    for _ in 0..30 {
        shell.handle_key(key(KeyCode::Char('j')));
    }
    draw_embedded(&mut terminal, &mut shell);
    assert_eq!(probe.builds(), 1);
    assert_eq!(*shell.controller().status(), LoadStatus::Pending);
}

#[test]
fn embedded_shell_builds_immediately_when_already_visible() {
    let probe = FakeProbe::new();
    let factory = Rc::new(FakeFactory::new(probe.clone()));
    let mut shell = EmbeddedShell::new(6, None);
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).expect("terminal");

    shell.open_document(
        session("a.txt"),
        factory,
        no_observer(),
        vec!["intro".to_string()],
    );
    draw_embedded(&mut terminal, &mut shell);

    assert_eq!(probe.builds(), 1);
}

#[test]
fn reopening_the_same_document_does_not_rebuild() {
    let probe = FakeProbe::new();
    let factory = Rc::new(FakeFactory::new(probe.clone()));
    let mut shell = EmbeddedShell::new(6, None);
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).expect("terminal");

    shell.open_document(session("a.txt"), factory.clone(), no_observer(), vec![]);
    draw_embedded(&mut terminal, &mut shell);
    shell.open_document(session("a.txt"), factory.clone(), no_observer(), vec![]);
    draw_embedded(&mut terminal, &mut shell);
    assert_eq!(probe.builds(), 1);
    assert_eq!(probe.disposes(), 0);

    // a different document replaces the engine
    shell.open_document(session("b.txt"), factory, no_observer(), vec![]);
    assert_eq!(probe.builds(), 2);
    assert_eq!(probe.disposes(), 1);

    shell.close_document();
    assert_eq!(probe.disposes(), 2);
    assert!(shell.session().is_none());
    assert_eq!(*shell.controller().status(), LoadStatus::NotActivated);
}

#[test]
fn fullscreen_key_falls_back_to_the_host_with_the_current_page() {
    let probe = FakeProbe::new();
    let factory = Rc::new(FakeFactory::new(probe.clone()));
    let mut shell = EmbeddedShell::new(6, None);
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).expect("terminal");

    probe.set_reading(EngineReading::direct(Some(3.0), Some(10.0)));
    shell.open_document(session("a.txt"), factory, no_observer(), vec![]);
    draw_embedded(&mut terminal, &mut shell);
    probe.fire_ready();
    shell.tick(Instant::now());
    assert!(shell.controller().status().is_ready());

    // fake engine has no native fullscreen
    match shell.handle_key(key(KeyCode::Char('f'))) {
        ShellAction::OpenFullscreen(fullscreen) => {
            assert_eq!(fullscreen.requested_initial_page, Some(3));
            assert_eq!(fullscreen.source, session("a.txt").source);
        }
        _ => panic!("expected the host fullscreen fallback"),
    }
}

#[test]
fn retry_key_rebuilds_a_failed_viewer_once() {
    let probe = FakeProbe::new();
    let factory = Rc::new(FakeFactory::new(probe.clone()));
    factory.fail_next_build.set(true);
    let mut shell = EmbeddedShell::new(6, None);
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).expect("terminal");

    shell.open_document(session("a.txt"), factory, no_observer(), vec![]);
    draw_embedded(&mut terminal, &mut shell);
    assert!(shell.controller().status().is_failed());
    assert_eq!(probe.builds(), 0);

    shell.handle_key(key(KeyCode::Char('r')));
    assert_eq!(probe.builds(), 1);
    assert_eq!(*shell.controller().status(), LoadStatus::Pending);

    // retry does nothing unless the viewer actually failed
    shell.handle_key(key(KeyCode::Char('r')));
    assert_eq!(probe.builds(), 1);
}

#[test]
fn modal_builds_on_open_and_tears_down_on_close() {
    let probe = FakeProbe::new();
    let factory = Rc::new(FakeFactory::new(probe.clone()));
    let mut modal = ModalShell::new(None);

    modal.open(session("a.txt"), factory.clone(), no_observer());
    assert!(modal.is_open());
    assert_eq!(probe.builds(), 1);
    probe.fire_ready();
    modal.tick(Instant::now());
    assert!(modal.controller().status().is_ready());

    modal.close();
    assert!(!modal.is_open());
    assert_eq!(probe.disposes(), 1);
    assert_eq!(*modal.controller().status(), LoadStatus::NotActivated);

    // reopening is a fresh session
    modal.open(session("a.txt"), factory, no_observer());
    assert_eq!(probe.builds(), 2);
}

#[test]
fn escape_closes_the_modal() {
    let probe = FakeProbe::new();
    let factory = Rc::new(FakeFactory::new(probe.clone()));
    let mut modal = ModalShell::new(None);
    modal.open(session("a.txt"), factory, no_observer());

    let action = modal.handle_key(key(KeyCode::Esc));
    assert!(matches!(action, ShellAction::ClosedModal));
    assert!(!modal.is_open());
    assert_eq!(probe.disposes(), 1);
}

#[test]
fn scripted_session_reads_a_text_document_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let text = "word ".repeat(4000);
    std::fs::write(dir.path().join("autumn_issue.txt"), text).expect("write doc");

    let library = Library::scan(dir.path());
    assert_eq!(library.len(), 1);

    let settings = Settings::default();
    let mut app = App::new(library, &settings, ReadingHistory::ephemeral());
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");

    let mut events = ScriptedEventSource::new(vec![
        ScriptedEventSource::key(KeyCode::Enter),
        ScriptedEventSource::char_key('l'),
        ScriptedEventSource::char_key('q'),
    ]);

    run_app_with_event_source(&mut terminal, &mut app, &mut events).expect("app run");

    assert!(app.should_quit());
    let controller = app.reader().controller();
    assert!(controller.status().is_ready());
    assert_eq!(controller.view().current_page(), Some(1));
}
