#![cfg(feature = "egui")]

use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText};

use super::state::{CatalogApp, ResultStatus};
use super::text::highlight_query_job;
use crate::card::Card;
use crate::chips::Chip;
use crate::render::SensorId;

/// One user interaction collected while drawing a frame.
enum Action {
    Back,
    Forward,
    Category(String),
    Search(String),
    SearchFocused,
    ClearSearch,
    Chip(Option<String>),
    Language(String),
    OpenItem { category: String, id: String },
    SentinelVisible(SensorId),
}

fn top_panel(app: &mut CatalogApp, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
    let active_tab = app.browser.head().active_tab.clone();
    let categories: Vec<(String, String)> = app
        .browser
        .store()
        .registry()
        .iter()
        .map(|c| (c.key.clone(), c.label.clone()))
        .collect();

    ui.horizontal(|ui| {
        let history = app.browser.history();
        if ui
            .add_enabled(history.can_go_back(), egui::Button::new("◀"))
            .clicked()
        {
            actions.push(Action::Back);
        }
        if ui
            .add_enabled(history.can_go_forward(), egui::Button::new("▶"))
            .clicked()
        {
            actions.push(Action::Forward);
        }
        ui.separator();
        for (key, label) in &categories {
            if ui.selectable_label(*key == active_tab, label).clicked() {
                actions.push(Action::Category(key.clone()));
            }
        }
    });

    ui.horizontal(|ui| {
        let resp = ui.add(
            egui::TextEdit::singleline(&mut app.search_text)
                .hint_text("Search in any language…")
                .desired_width(320.0),
        );
        if resp.gained_focus() {
            actions.push(Action::SearchFocused);
        }
        if resp.changed() {
            actions.push(Action::Search(app.search_text.clone()));
        }
        if !app.search_text.is_empty() && ui.button("✕").clicked() {
            actions.push(Action::ClearSearch);
        }
        ui.separator();
        ui.label(app.browser.counter().to_string());
        ui.separator();
        ui.toggle_value(&mut app.show_languages, "Languages");
    });

    chip_row(&app.browser.chips(), ui, actions);

    if app.show_languages {
        let active = app.browser.languages().to_vec();
        let config = app.browser.config();
        ui.horizontal_wrapped(|ui| {
            for (code, name) in &config.languages {
                if ui.selectable_label(active.contains(code), name).clicked() {
                    actions.push(Action::Language(code.clone()));
                }
            }
        });
    }
}

fn chip_row(chips: &[Chip], ui: &mut egui::Ui, actions: &mut Vec<Action>) {
    ui.horizontal_wrapped(|ui| {
        for chip in chips {
            if ui.selectable_label(chip.active, &chip.label).clicked() {
                actions.push(Action::Chip(chip.tag.clone()));
            }
        }
    });
}

fn card_view(
    card: &Card,
    query: &str,
    highlighted: bool,
    ui: &mut egui::Ui,
    actions: &mut Vec<Action>,
) -> egui::Response {
    let mut frame = egui::Frame::group(ui.style());
    if highlighted {
        frame = frame.stroke(egui::Stroke::new(2.0, Color32::from_rgb(230, 160, 0)));
    }
    frame
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(highlight_query_job(&card.title, query));
                if let Some(sci) = &card.scientific_name {
                    ui.label(RichText::new(sci).italics().weak());
                }
                if ui.small_button("🔗").on_hover_text(&card.share_url).clicked() {
                    ui.ctx().copy_text(card.share_url.clone());
                    actions.push(Action::OpenItem {
                        category: card.category.clone(),
                        id: card.id.clone(),
                    });
                }
            });
            if !card.badges.is_empty() {
                ui.horizontal(|ui| {
                    for badge in &card.badges {
                        ui.label(RichText::new(badge).small());
                    }
                });
            }
            egui::Grid::new(("names", &card.category, &card.id))
                .num_columns(2)
                .show(ui, |ui| {
                    for row in &card.primary {
                        ui.label(RichText::new(&row.label).strong());
                        ui.label(highlight_query_job(&row.value, query));
                        ui.end_row();
                    }
                });
            egui::CollapsingHeader::new("Other languages")
                .id_salt(("other", &card.category, &card.id))
                .show(ui, |ui| {
                    egui::Grid::new(("other-names", &card.category, &card.id))
                        .num_columns(2)
                        .show(ui, |ui| {
                            for row in &card.other {
                                ui.label(&row.label);
                                ui.label(highlight_query_job(&row.value, query));
                                ui.end_row();
                            }
                        });
                });
            if let Some(notes) = &card.notes {
                ui.label(highlight_query_job(notes, query));
            }
        })
        .response
}

fn results_panel(app: &mut CatalogApp, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
    let query = app.browser.view().query.clone();
    let list = app.browser.target();
    match &list.status {
        ResultStatus::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading…");
            });
            return;
        }
        ResultStatus::Error(message) => {
            ui.colored_label(Color32::RED, format!("Failed to load data: {}", message));
            return;
        }
        ResultStatus::NoResults => {
            ui.label("No results found.");
            return;
        }
        ResultStatus::Cards => {}
    }

    let highlight = list.highlight.clone();
    let mut area = egui::ScrollArea::vertical().auto_shrink([false, false]);
    if list.scroll_top {
        area = area.vertical_scroll_offset(0.0);
    }
    area.show(ui, |ui| {
        for card in &list.cards {
            let is_target = highlight.as_deref() == Some(card.id.as_str());
            let resp = card_view(card, &query, is_target, ui, actions);
            if is_target {
                resp.scroll_to_me(Some(egui::Align::Center));
            }
        }
        if let Some(sensor) = list.sentinel {
            let resp = ui.label(RichText::new("Loading more…").weak());
            if ui.is_rect_visible(resp.rect) {
                actions.push(Action::SentinelVisible(sensor));
            }
        }
    });
}

fn apply(app: &mut CatalogApp, action: Action) {
    let browser = &mut app.browser;
    match action {
        Action::Back => {
            browser.back();
            app.sync_search_text();
        }
        Action::Forward => {
            browser.forward();
            app.sync_search_text();
        }
        Action::Category(key) => {
            browser.select_category(&key);
            app.sync_search_text();
        }
        Action::Search(text) => browser.edit_search(&text, Instant::now()),
        Action::SearchFocused => browser.search_focused(),
        Action::ClearSearch => {
            browser.clear_search();
            app.search_text.clear();
        }
        Action::Chip(Some(tag)) => {
            browser.toggle_tag(&tag);
        }
        Action::Chip(None) => browser.clear_tags(),
        Action::Language(code) => {
            if let Err(err) = browser.toggle_language(&code) {
                tracing::error!(error = %err, "failed to store language preference");
            }
        }
        Action::OpenItem { category, id } => {
            browser.open_item(&category, &id);
            app.sync_search_text();
        }
        Action::SentinelVisible(sensor) => {
            browser.on_sentinel_visible(sensor);
        }
    }
}

/// Draw one frame and apply the interactions it produced.
pub fn update(app: &mut CatalogApp, ctx: &egui::Context) {
    let mut actions = Vec::new();

    egui::TopBottomPanel::top("top").show(ctx, |ui| {
        top_panel(app, ui, &mut actions);
    });
    egui::CentralPanel::default().show(ctx, |ui| {
        results_panel(app, ui, &mut actions);
    });

    // Scroll requests are one-shot.
    {
        let list = app.browser.target_mut();
        list.scroll_top = false;
        list.highlight = None;
    }

    let had_actions = !actions.is_empty();
    for action in actions {
        apply(app, action);
    }
    app.pump();

    let head = app.browser.head_mut();
    if head.dirty {
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(head.title.clone()));
        head.dirty = false;
    }
    if had_actions {
        ctx.request_repaint();
    } else if app.browser.has_pending_write() {
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
