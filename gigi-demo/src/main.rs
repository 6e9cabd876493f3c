//! GiGi demo - a headless frame loop.
//!
//! Builds a small dialog (labels and buttons in a deferred grid layout),
//! replays a scripted input sequence against it and logs what each frame drew.
//! Run with `RUST_LOG=debug` to see dispatch and frame timing output.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use gigi::control::{Button, Label};
use gigi::{
    Alignment, DeferredLayout, Gui, GuiConfig, GuiInput, Layout, Modifiers, MouseButton, Pt,
    RecordingRenderer, Rect, WndFlags, WndId,
};

#[derive(Parser, Debug)]
#[command(name = "gigi-demo", about = "Run a scripted GiGi session headlessly")]
struct Args {
    /// JSON file with GUI settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated milliseconds between frames.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Print every draw command of the last frame.
    #[arg(long)]
    dump: bool,
}

struct Dialog {
    window: WndId,
    ok: WndId,
    cancel: WndId,
    status: WndId,
}

fn build_dialog(gui: &mut Gui) -> Result<Dialog> {
    let tree = gui.tree_mut();
    let window = tree.create(
        Rect::ltrb(40, 40, 360, 240),
        WndFlags::INTERACTIVE | WndFlags::DRAGABLE | WndFlags::RESIZABLE,
        Label::new("Settings"),
    );
    tree.set_name(window, "dialog")?;

    let status = tree.create(Rect::ZERO, WndFlags::empty(), Label::new("Nothing clicked yet"));
    let name = tree.create(Rect::ZERO, WndFlags::empty(), Label::new("Name"));

    let ok = tree.create(
        Rect::ltrb(0, 0, 80, 24),
        WndFlags::INTERACTIVE,
        Button::new("OK").on_click(move |cx| {
            if let Some(label) = cx.tree.behavior_mut::<Label>(status) {
                label.set_text("OK clicked");
            }
        }),
    );
    tree.set_browse_text(ok, "Apply the settings")?;
    let cancel = tree.create(
        Rect::ltrb(0, 0, 80, 24),
        WndFlags::INTERACTIVE,
        Button::new("Cancel").on_click(move |cx| {
            if let Some(label) = cx.tree.behavior_mut::<Label>(status) {
                label.set_text("Cancelled");
            }
        }),
    );

    let mut layout = Layout::new(3, 2, 8, 4);
    layout.set_row_stretch(1, 1.0)?;
    layout.set_column_stretch(0, 1.0)?;
    layout.set_column_stretch(1, 1.0)?;
    layout.set_minimum_row_height(0, gigi::Y(20))?;
    layout.set_minimum_row_height(2, gigi::Y(24))?;
    layout.add(name, 0, 0, 1, 2, Alignment::empty())?;
    layout.add(status, 1, 0, 1, 2, Alignment::TOP | Alignment::LEFT)?;
    layout.add(ok, 2, 0, 1, 1, Alignment::RIGHT | Alignment::VCENTER)?;
    layout.add(cancel, 2, 1, 1, 1, Alignment::LEFT | Alignment::VCENTER)?;
    tree.set_layout(window, DeferredLayout::new(layout))?;

    gui.register(window)?;
    Ok(Dialog {
        window,
        ok,
        cancel,
        status,
    })
}

fn run_frame(gui: &mut Gui, now: Instant, renderer: &mut RecordingRenderer) {
    renderer.clear();
    gui.frame(now, renderer);
    tracing::info!(
        frame = gui.frame_count(),
        commands = renderer.commands.len(),
        texts = ?renderer.texts(),
        "frame drawn"
    );
}

fn move_to(gui: &mut Gui, pt: Pt, now: Instant) {
    gui.handle_input(GuiInput::MouseMoved { pt, mods: Modifiers::NONE }, now);
}

fn press(gui: &mut Gui, pt: Pt, now: Instant) {
    let mods = Modifiers::NONE;
    gui.handle_input(GuiInput::ButtonPressed { button: MouseButton::Left, pt, mods }, now);
}

fn release(gui: &mut Gui, pt: Pt, now: Instant) {
    let mods = Modifiers::NONE;
    gui.handle_input(GuiInput::ButtonReleased { button: MouseButton::Left, pt, mods }, now);
}

fn main() -> Result<()> {
    gigi::logging::init();
    gigi::flags::init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => GuiConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GuiConfig::default(),
    };

    let mut gui = Gui::new(config);
    let dialog = build_dialog(&mut gui)?;
    let mut renderer = RecordingRenderer::new();
    let step = Duration::from_millis(args.frame_ms);
    let mut now = Instant::now();

    run_frame(&mut gui, now, &mut renderer);
    let ok_rect = gui.tree().screen_rect(dialog.ok)?;
    let ok_center = Pt::new(
        ok_rect.left() + ok_rect.width() / 2,
        ok_rect.top() + ok_rect.height() / 2,
    );

    // Hover the OK button long enough for its browse info.
    move_to(&mut gui, ok_center, now);
    let dwell = gui.config().browse_modes.first().copied().unwrap_or(1000);
    now += Duration::from_millis(dwell) + step;
    run_frame(&mut gui, now, &mut renderer);

    // Click it.
    press(&mut gui, ok_center, now);
    release(&mut gui, ok_center, now);
    now += step;
    run_frame(&mut gui, now, &mut renderer);

    // Drag the dialog by its title area, then resize it from the corner.
    let title = gui.tree().screen_rect(dialog.window)?.ul + Pt::xy(20, 4);
    press(&mut gui, title, now);
    move_to(&mut gui, title + Pt::xy(60, 30), now);
    release(&mut gui, title + Pt::xy(60, 30), now);

    let corner = gui.tree().screen_rect(dialog.window)?.lr - Pt::xy(2, 2);
    press(&mut gui, corner, now);
    move_to(&mut gui, corner + Pt::xy(80, 40), now);
    release(&mut gui, corner + Pt::xy(80, 40), now);
    now += step;
    run_frame(&mut gui, now, &mut renderer);

    let tree = gui.tree();
    tracing::info!(
        dialog = %tree.screen_rect(dialog.window)?,
        cancel = %tree.screen_rect(dialog.cancel)?,
        status = tree.behavior::<Label>(dialog.status).map(|l| l.text()).unwrap_or_default(),
        focus = ?gui.focus(),
        "session finished"
    );

    if args.dump {
        for command in &renderer.commands {
            println!("{command:?}");
        }
    }
    Ok(())
}
