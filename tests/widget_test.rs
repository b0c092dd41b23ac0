use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use typecast::clipboard::{ScratchId, ScratchSurface};
use typecast::copy::{COPIED_LABEL, IDLE_LABEL, RESET_DELAY};
use typecast::host::{AnalyticsSink, ButtonState, FeedbackView, Host, TextDisplay, WidgetRoot};
use typecast::{
    ClipboardSink, ClipboardStrategy, CopyOutcome, EventLoop, Phase, ScratchCopy, Services,
    SnippetConfig, WidgetHandle, init,
};

const STEP: Duration = Duration::from_millis(100);

/// Everything the widget did to the page.
#[derive(Default)]
struct Page {
    renders: Vec<String>,
    announcements: Vec<String>,
    button: Option<ButtonState>,
    label: Option<String>,
    toast: bool,
    mutations: usize,
    clipboard: Vec<String>,
    scratch_live: usize,
    scratch_removed: usize,
    primary_calls: usize,
    tracked: Vec<(String, String)>,
}

type SharedPage = Rc<RefCell<Page>>;

struct PageDisplay(SharedPage);

impl TextDisplay for PageDisplay {
    fn render(&mut self, text: &str) {
        let mut page = self.0.borrow_mut();
        page.renders.push(text.to_string());
        page.mutations += 1;
    }

    fn announce(&mut self, text: &str) {
        let mut page = self.0.borrow_mut();
        page.announcements.push(text.to_string());
        page.mutations += 1;
    }
}

struct PageFeedback(SharedPage);

impl FeedbackView for PageFeedback {
    fn set_button_state(&mut self, state: ButtonState) {
        let mut page = self.0.borrow_mut();
        page.button = Some(state);
        page.mutations += 1;
    }

    fn set_button_label(&mut self, label: &str) {
        let mut page = self.0.borrow_mut();
        page.label = Some(label.to_string());
        page.mutations += 1;
    }

    fn set_toast_visible(&mut self, visible: bool) {
        let mut page = self.0.borrow_mut();
        page.toast = visible;
        page.mutations += 1;
    }
}

struct PageHost {
    page: SharedPage,
    selector: &'static str,
}

impl Host for PageHost {
    fn resolve_root(&self, selector: &str) -> Option<WidgetRoot> {
        (selector == self.selector).then(|| WidgetRoot {
            display: Box::new(PageDisplay(self.page.clone())),
            feedback: Box::new(PageFeedback(self.page.clone())),
        })
    }
}

/// Primary clipboard that rejects or accepts every write.
struct Primary {
    page: SharedPage,
    accept: bool,
}

#[async_trait(?Send)]
impl ClipboardStrategy for Primary {
    fn name(&self) -> &'static str {
        "primary"
    }

    async fn write(&self, text: &str) -> Result<()> {
        let mut page = self.page.borrow_mut();
        page.primary_calls += 1;
        if self.accept {
            page.clipboard.push(text.to_string());
            Ok(())
        } else {
            Err(anyhow!("clipboard permission denied"))
        }
    }
}

/// Scratch element surface backed by the page.
struct PageScratch {
    page: SharedPage,
    text: Option<String>,
    copy_works: bool,
}

impl ScratchSurface for PageScratch {
    fn insert(&mut self, text: &str) -> Result<ScratchId> {
        self.text = Some(text.to_string());
        self.page.borrow_mut().scratch_live += 1;
        Ok(ScratchId(1))
    }

    fn select(&mut self, _id: ScratchId) -> Result<()> {
        Ok(())
    }

    fn exec_copy(&mut self) -> Result<bool> {
        if !self.copy_works {
            return Err(anyhow!("execCommand unsupported"));
        }
        let text = self.text.clone().unwrap_or_default();
        self.page.borrow_mut().clipboard.push(text);
        Ok(true)
    }

    fn remove(&mut self, _id: ScratchId) {
        self.text = None;
        let mut page = self.page.borrow_mut();
        page.scratch_live -= 1;
        page.scratch_removed += 1;
    }
}

struct PageAnalytics(SharedPage);

impl AnalyticsSink for PageAnalytics {
    fn track(&self, event: &str, text: &str) {
        self.0
            .borrow_mut()
            .tracked
            .push((event.to_string(), text.to_string()));
    }
}

struct Harness {
    event_loop: Rc<EventLoop>,
    page: SharedPage,
    widget: WidgetHandle,
}

impl Harness {
    fn pump(&self, times: usize) {
        for _ in 0..times {
            self.event_loop.advance(STEP);
        }
    }
}

fn harness(config: SnippetConfig, primary_accepts: bool, fallback_works: bool) -> Harness {
    let page = SharedPage::default();
    let host = PageHost {
        page: page.clone(),
        selector: "[data-smart-cli]",
    };
    let event_loop = Rc::new(EventLoop::new());
    let clipboard = ClipboardSink::new()
        .with_strategy(Primary {
            page: page.clone(),
            accept: primary_accepts,
        })
        .with_strategy(ScratchCopy::new(PageScratch {
            page: page.clone(),
            text: None,
            copy_works: fallback_works,
        }));
    let services = Services::new(clipboard)
        .with_analytics(Rc::new(PageAnalytics(page.clone())))
        .with_rng(Box::new(StdRng::seed_from_u64(42)));
    let widget = init(&host, event_loop.clone(), &config, services)
        .expect("valid config")
        .expect("root present");
    Harness {
        event_loop,
        page,
        widget,
    }
}

#[test]
fn test_missing_root_is_inert() {
    let page = SharedPage::default();
    let host = PageHost {
        page: page.clone(),
        selector: "#elsewhere",
    };
    let event_loop = Rc::new(EventLoop::new());
    let widget = init(
        &host,
        event_loop.clone(),
        &SnippetConfig::default(),
        Services::new(ClipboardSink::new()),
    )
    .unwrap();
    assert!(widget.is_none());
    assert_eq!(event_loop.pending_frames(), 0);
}

#[test]
fn test_empty_commands_fail_fast() {
    let host = PageHost {
        page: SharedPage::default(),
        selector: "[data-smart-cli]",
    };
    let config = SnippetConfig::with_commands(Vec::<String>::new());
    let err = init(
        &host,
        Rc::new(EventLoop::new()),
        &config,
        Services::new(ClipboardSink::new()),
    )
    .err()
    .expect("empty commands must be rejected");
    assert!(format!("{err:#}").contains("at least one"), "got: {err:#}");
}

#[test]
fn test_nothing_happens_until_visible() {
    let h = harness(SnippetConfig::with_commands(["ls"]), true, true);
    h.pump(10);
    assert!(h.page.borrow().renders.is_empty());
    assert_eq!(h.widget.snapshot().phase, Phase::Idle);

    h.widget.on_visibility(0.5);
    h.pump(3);
    assert_eq!(h.page.borrow().renders, vec!["l", "ls"]);
}

#[test]
fn test_full_cycle_types_pauses_deletes_and_advances() {
    let config = SnippetConfig::with_commands(["ab", "cd"]).pause_between(Duration::from_millis(300));
    let h = harness(config, true, true);
    h.widget.on_visibility(1.0);

    h.pump(4);
    assert_eq!(h.widget.snapshot().phase, Phase::Paused);
    h.pump(3);
    assert_eq!(h.widget.snapshot().phase, Phase::Running);
    h.pump(4);

    let snapshot = h.widget.snapshot();
    assert_eq!(snapshot.command_index, 1);
    assert_eq!(h.page.borrow().renders, vec!["a", "ab", "a", "", "", "c"]);
    assert_eq!(h.page.borrow().announcements, vec!["ab"]);
}

#[test]
fn test_accepted_ticks_match_length_regardless_of_jitter() {
    let command = "pip install snakeskin-xplnhub";
    for seed in 0..8 {
        let page = SharedPage::default();
        let host = PageHost {
            page: page.clone(),
            selector: "[data-smart-cli]",
        };
        let event_loop = Rc::new(EventLoop::new());
        let services =
            Services::new(ClipboardSink::new()).with_rng(Box::new(StdRng::seed_from_u64(seed)));
        let widget = init(
            &host,
            event_loop.clone(),
            &SnippetConfig::with_commands([command]).looping(false),
            services,
        )
        .unwrap()
        .unwrap();
        widget.on_visibility(1.0);

        // Frames at 16 ms reject most ticks; the accepted ones still add one
        // character each.
        event_loop.run_for(Duration::from_secs(10), Duration::from_millis(16));
        let page = page.borrow();
        assert_eq!(page.renders.len(), command.len(), "seed {seed}");
        assert_eq!(page.renders.last().map(String::as_str), Some(command));
        assert_eq!(page.announcements, vec![command]);
        assert_eq!(widget.snapshot().phase, Phase::Finished);
    }
}

#[test]
fn test_finished_widget_ignores_visibility() {
    let h = harness(SnippetConfig::with_commands(["ls"]).looping(false), true, true);
    h.widget.on_visibility(1.0);
    h.pump(10);
    assert_eq!(h.widget.snapshot().phase, Phase::Finished);

    let mutations = h.page.borrow().mutations;
    h.widget.on_visibility(0.0);
    h.widget.on_visibility(1.0);
    h.pump(20);
    assert_eq!(h.page.borrow().mutations, mutations);
    assert_eq!(h.page.borrow().renders.last().map(String::as_str), Some("ls"));
}

#[tokio::test]
async fn test_copy_uses_primary_clipboard() {
    let h = harness(SnippetConfig::default(), true, true);
    let outcome = h.widget.on_copy_click().await;

    assert_eq!(outcome, Some(CopyOutcome::Copied { via: "primary" }));
    let page = h.page.borrow();
    assert_eq!(page.clipboard, vec!["pip install snakeskin-xplnhub"]);
    assert_eq!(page.scratch_removed, 0);
    assert_eq!(page.button, Some(ButtonState::Success));
    assert_eq!(page.label.as_deref(), Some(COPIED_LABEL));
    assert!(page.toast);
    assert_eq!(
        page.tracked,
        vec![("copy".to_string(), "pip install snakeskin-xplnhub".to_string())]
    );
}

#[tokio::test]
async fn test_rejected_primary_falls_back_once() {
    let h = harness(SnippetConfig::default(), false, true);
    let outcome = h.widget.on_copy_click().await;

    assert_eq!(outcome, Some(CopyOutcome::Copied { via: "scratch" }));
    let page = h.page.borrow();
    assert_eq!(page.primary_calls, 1);
    assert_eq!(page.clipboard, vec!["pip install snakeskin-xplnhub"]);
    assert_eq!(page.scratch_live, 0);
    assert_eq!(page.scratch_removed, 1);
    assert!(h.widget.feedback_active());
    // Only primary-clipboard copies reach analytics.
    assert!(page.tracked.is_empty());
}

#[tokio::test]
async fn test_copy_works_without_analytics() {
    let page = SharedPage::default();
    let host = PageHost {
        page: page.clone(),
        selector: "[data-smart-cli]",
    };
    let event_loop = Rc::new(EventLoop::new());
    let clipboard = ClipboardSink::new().with_strategy(Primary {
        page: page.clone(),
        accept: true,
    });
    let widget = init(
        &host,
        event_loop.clone(),
        &SnippetConfig::default(),
        Services::new(clipboard),
    )
    .expect("valid config")
    .expect("root present");

    let outcome = widget.on_copy_click().await;
    assert_eq!(outcome, Some(CopyOutcome::Copied { via: "primary" }));
    assert!(widget.feedback_active());
    {
        let page = page.borrow();
        assert_eq!(page.clipboard, vec!["pip install snakeskin-xplnhub"]);
        assert_eq!(page.button, Some(ButtonState::Success));
        assert_eq!(page.label.as_deref(), Some(COPIED_LABEL));
        assert!(page.toast);
        assert!(page.tracked.is_empty());
    }

    event_loop.advance(RESET_DELAY);
    assert!(!widget.feedback_active());
}

#[tokio::test]
async fn test_failed_fallback_cleans_up_without_feedback() {
    let h = harness(SnippetConfig::default(), false, false);
    let outcome = h.widget.on_copy_click().await;

    assert_eq!(outcome, Some(CopyOutcome::Failed));
    assert!(!h.widget.feedback_active());
    let page = h.page.borrow();
    assert!(page.clipboard.is_empty());
    assert_eq!(page.scratch_live, 0);
    assert_eq!(page.scratch_removed, 1);
    assert_eq!(page.button, None);
    assert!(page.tracked.is_empty());
}

#[tokio::test]
async fn test_feedback_resets_once_after_rapid_copies() {
    let h = harness(SnippetConfig::default(), true, true);
    for _ in 0..5 {
        h.widget.on_copy_click().await;
        assert_eq!(h.event_loop.pending_timers(), 1);
    }
    assert!(h.widget.feedback_active());

    h.event_loop.advance(RESET_DELAY);
    assert!(!h.widget.feedback_active());
    let page = h.page.borrow();
    assert_eq!(page.button, Some(ButtonState::Idle));
    assert_eq!(page.label.as_deref(), Some(IDLE_LABEL));
    assert!(!page.toast);
}

#[tokio::test]
async fn test_dispose_stops_everything() {
    let h = harness(SnippetConfig::with_commands(["hello"]), true, true);
    h.widget.on_visibility(1.0);
    h.pump(3);
    h.widget.on_copy_click().await;
    assert!(h.event_loop.pending_frames() > 0);
    assert_eq!(h.event_loop.pending_timers(), 1);

    h.widget.dispose();
    h.widget.dispose();
    assert!(h.widget.is_disposed());
    assert_eq!(h.event_loop.pending_frames(), 0);
    assert_eq!(h.event_loop.pending_timers(), 0);

    let mutations = h.page.borrow().mutations;
    h.widget.on_visibility(1.0);
    assert_eq!(h.widget.on_copy_click().await, None);
    h.event_loop.run_for(Duration::from_secs(5), STEP);
    assert_eq!(h.page.borrow().mutations, mutations);
    assert!(h.widget.feedback_active());
}

#[test]
fn test_dropping_handle_disposes() {
    let h = harness(SnippetConfig::with_commands(["hello"]), true, true);
    h.widget.on_visibility(1.0);
    h.pump(2);
    let Harness {
        event_loop,
        page,
        widget,
    } = h;
    drop(widget);

    let renders = page.borrow().renders.len();
    event_loop.run_for(Duration::from_secs(2), STEP);
    assert_eq!(page.borrow().renders.len(), renders);
    assert_eq!(event_loop.pending_frames(), 0);
}
