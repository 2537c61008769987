use crate::analysis::AnalysisService;
use crate::event::AppEvent;
use crate::model::{AnalysisResult, Complexity, OptimizationCategory};
use crate::theme::Theme;
use crate::workflow::Workflow;
use eframe::egui::{self, Color32, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

/// 2023 progressive scale thresholds, only used to draw the TMI positioning
/// strip on the dashboard.
const TMI_BRACKETS: [(f64, &str, &str); 5] = [
    (0.0, "0 %", "jusqu'à 11 294 €"),
    (11.0, "11 %", "11 294 — 28 797 €"),
    (30.0, "30 %", "28 797 — 82 341 €"),
    (41.0, "41 %", "82 341 — 177 106 €"),
    (45.0, "45 %", "au-delà de 177 106 €"),
];

pub struct OptiTaxApp {
    rx: Receiver<AppEvent>,
    service: AnalysisService,
    workflow: Workflow,
    theme: Theme,
    path_input: String,
    export_notice: Option<String>,
}

impl OptiTaxApp {
    pub fn new(rx: Receiver<AppEvent>, service: AnalysisService) -> Self {
        Self {
            rx,
            service,
            workflow: Workflow::default(),
            theme: Theme::default(),
            path_input: String::new(),
            export_notice: None,
        }
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    self.apply_event(event);
                    ctx.request_repaint();
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::AnalysisCompleted(result) => self.workflow.complete(*result),
            AppEvent::AnalysisFailed(_detail) => self.workflow.fail(),
        }
    }

    fn collect_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        for file in dropped {
            if let Some(path) = file.path {
                self.workflow.add_file(path);
            }
        }
    }

    fn trigger_run(&mut self, ctx: &egui::Context) {
        if let Some(input) = self.workflow.begin_run() {
            self.export_notice = None;
            self.service.spawn_run(input.files, input.user_context);
            ctx.request_repaint();
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong(RichText::new("OptiTax").size(18.0));
                ui.label(
                    RichText::new("Expertise Patrimoniale IA")
                        .color(self.theme.accent_muted)
                        .small(),
                );
                ui.separator();
                let status = if self.workflow.is_loading() {
                    RichText::new("Analyse en cours...").color(self.theme.warning)
                } else if self.workflow.result().is_some() {
                    RichText::new("Audit disponible").color(self.theme.success)
                } else {
                    RichText::new("Prêt").color(self.theme.text_muted)
                };
                ui.label(status);
            });
        });
    }

    fn render_central(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                if self.workflow.is_loading() {
                    self.render_loading(ui);
                } else if let Some(result) = self.workflow.result().cloned() {
                    self.render_dashboard(ui, &result);
                } else {
                    self.render_upload(ui);
                }
            });
        });
    }

    fn render_loading(&self, ui: &mut egui::Ui) {
        ui.add_space(80.0);
        ui.vertical_centered(|ui| {
            ui.add(egui::Spinner::new().size(48.0).color(self.theme.accent_primary));
            ui.add_space(16.0);
            ui.heading("Génération de l'Audit...");
            ui.label(
                RichText::new(
                    "L'IA d'OptiTax analyse vos documents et vos commentaires pour maximiser le gain fiscal.",
                )
                .color(self.theme.text_muted),
            );
        });
    }

    fn render_upload(&mut self, ui: &mut egui::Ui) {
        ui.add_space(24.0);
        ui.vertical_centered(|ui| {
            ui.heading("Analysez les avis d'imposition de vos clients");
            ui.label(
                RichText::new("Décelez chaque levier d'optimisation en un instant.")
                    .color(self.theme.text_muted),
            );
        });
        ui.add_space(16.0);

        let theme = self.theme.clone();
        theme.card_frame().show(ui, |ui| {
            ui.strong("Documents fiscaux");
            ui.label(
                RichText::new("Glissez vos fichiers (images, PDF) dans la fenêtre ou saisissez un chemin.")
                    .color(theme.text_muted),
            );

            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut self.path_input)
                        .desired_width(360.0)
                        .hint_text("/chemin/vers/avis-imposition.pdf"),
                );
                let add_clicked = ui
                    .add_enabled(
                        !self.path_input.trim().is_empty(),
                        egui::Button::new("Ajouter"),
                    )
                    .clicked();
                if add_clicked {
                    let path = std::path::PathBuf::from(self.path_input.trim());
                    self.workflow.add_file(path);
                    self.path_input.clear();
                }
            });

            if !self.workflow.files().is_empty() {
                ui.add_space(8.0);
                ui.label(
                    RichText::new(format!(
                        "Fichiers sélectionnés ({})",
                        self.workflow.files().len()
                    ))
                    .small()
                    .color(theme.text_muted),
                );
                let mut remove_index: Option<usize> = None;
                for (index, file) in self.workflow.files().iter().enumerate() {
                    ui.horizontal(|ui| {
                        ui.label(&file.name);
                        if ui.small_button("Retirer").clicked() {
                            remove_index = Some(index);
                        }
                    });
                }
                if let Some(index) = remove_index {
                    self.workflow.remove_file(index);
                }
            }

            ui.add_space(12.0);
            ui.label(
                RichText::new("Commentaires & contexte (optionnel)")
                    .small()
                    .color(theme.text_muted),
            );
            ui.add(
                egui::TextEdit::multiline(self.workflow.user_context_mut())
                    .desired_rows(3)
                    .desired_width(f32::INFINITY)
                    .hint_text("Ex: Projet d'investissement, changement de situation familiale..."),
            );

            if let Some(message) = self.workflow.error_message().map(str::to_string) {
                ui.add_space(8.0);
                theme
                    .banner_frame(Color32::from_rgb(0xFF, 0xF1, 0xF2))
                    .show(ui, |ui| {
                        ui.label(RichText::new(message).color(theme.danger).strong());
                    });
            }

            ui.add_space(12.0);
            let run_clicked = ui
                .add_enabled(
                    !self.workflow.is_loading(),
                    egui::Button::new(
                        RichText::new("Lancer l'Analyse Patrimoniale").strong(),
                    )
                    .min_size(egui::vec2(ui.available_width(), 40.0)),
                )
                .clicked();
            if run_clicked {
                let ctx = ui.ctx().clone();
                self.trigger_run(&ctx);
            }
        });
    }

    fn render_dashboard(&mut self, ui: &mut egui::Ui, result: &AnalysisResult) {
        let theme = self.theme.clone();

        ui.horizontal(|ui| {
            if ui.button("← Nouvel Audit").clicked() {
                self.workflow.reset();
                self.export_notice = None;
                return;
            }
            if ui.button("Export JSON").clicked() {
                self.export(result, false);
            }
            if ui.button("Rapport imprimable").clicked() {
                self.export(result, true);
            }
        });
        if self.workflow.result().is_none() {
            // Reset happened this frame; skip the stale dashboard.
            return;
        }
        if let Some(notice) = &self.export_notice {
            ui.label(RichText::new(notice).color(theme.success).small());
        }
        ui.add_space(8.0);

        let data = &result.extracted_data;
        theme.card_frame().show(ui, |ui| {
            ui.heading(&data.full_name);
            if let Some(year) = data.year {
                ui.label(
                    RichText::new(format!("Situation fiscale {year}")).color(theme.text_muted),
                );
            }
            ui.add_space(8.0);
            ui.horizontal_wrapped(|ui| {
                metric(ui, &theme, "TMI actuelle", &format!("{:.0} %", data.tmi));
                metric(
                    ui,
                    &theme,
                    "Revenu imposable",
                    &format!("{:.0} €", data.taxable_income),
                );
                if let Some(parts) = data.household_parts {
                    metric(ui, &theme, "Parts fiscales", &parts.to_string());
                }
                if let Some(tax) = data.total_tax_paid {
                    metric(ui, &theme, "Impôt sur le revenu", &format!("{tax:.0} €"));
                }
                if let Some(ceiling) = data.per_ceiling_available {
                    metric(ui, &theme, "Plafond PER dispo.", &format!("{ceiling:.0} €"));
                }
            });
        });

        ui.add_space(8.0);
        theme.card_frame().show(ui, |ui| {
            ui.strong("Positionnement TMI");
            ui.horizontal_wrapped(|ui| {
                for (rate, label, range) in TMI_BRACKETS {
                    let reached = data.tmi >= rate;
                    let color = if reached {
                        theme.accent_muted
                    } else {
                        theme.text_muted
                    };
                    ui.vertical(|ui| {
                        ui.label(RichText::new(label).color(color).strong());
                        ui.label(RichText::new(range).color(theme.text_muted).small());
                    });
                    ui.add_space(12.0);
                }
            });
        });

        if !result.summary.is_empty() {
            ui.add_space(8.0);
            theme.card_frame().show(ui, |ui| {
                ui.strong("Synthèse de l'expert");
                ui.label(RichText::new(format!("« {} »", result.summary)).italics());
            });
        }

        if !data.real_estate_income.is_empty() || data.financial_income.is_some() {
            ui.add_space(8.0);
            theme.card_frame().show(ui, |ui| {
                ui.strong("Revenus du patrimoine");
                for income in &data.real_estate_income {
                    ui.label(format!(
                        "Immobilier {:?} — {:.0} € (régime {:?})",
                        income.kind, income.amount, income.regime
                    ));
                }
                if let Some(financial) = &data.financial_income {
                    if let Some(dividends) = financial.dividends {
                        ui.label(format!("Dividendes — {dividends:.0} €"));
                    }
                    if let Some(gains) = financial.capital_gains {
                        ui.label(format!("Plus-values — {gains:.0} €"));
                    }
                    if let Some(regime) = financial.regime {
                        ui.label(format!("Imposition : {regime:?}"));
                    }
                }
            });
        }

        ui.add_space(8.0);
        theme.card_frame().show(ui, |ui| {
            ui.strong("Stratégies d'optimisation préconisées");
            if result.optimizations.is_empty() {
                ui.label(
                    RichText::new("Aucune optimisation supplémentaire détectée.")
                        .color(theme.text_muted),
                );
            }
            for opt in &result.optimizations {
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(opt.category.label())
                            .small()
                            .color(category_color(&theme, opt.category))
                            .strong(),
                    );
                    ui.label(
                        RichText::new(format!("Gain est. : {}", opt.estimated_gain))
                            .color(theme.success)
                            .strong(),
                    );
                });
                ui.strong(&opt.title);
                ui.label(&opt.description);
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Complexité :").small().color(theme.text_muted));
                    ui.label(
                        RichText::new(opt.complexity.label())
                            .small()
                            .color(complexity_color(&theme, opt.complexity)),
                    );
                });
                ui.label(
                    RichText::new(format!("→ {}", opt.actionable)).color(theme.text_muted),
                );
            }
        });
    }

    fn export(&mut self, result: &AnalysisResult, printable: bool) {
        let dir = std::env::current_dir().unwrap_or_else(|_| ".".into());
        let outcome = if printable {
            crate::report::export_report(result, &dir)
        } else {
            crate::report::export_json(result, &dir)
        };
        match outcome {
            Ok(path) => {
                self.export_notice = Some(format!("Exporté vers {}", path.display()));
            }
            Err(err) => {
                tracing::error!("export failed: {err}");
                self.export_notice = Some("Échec de l'export.".to_string());
            }
        }
    }
}

fn metric(ui: &mut egui::Ui, theme: &Theme, label: &str, value: &str) {
    ui.vertical(|ui| {
        ui.label(RichText::new(label).small().color(theme.text_muted));
        ui.label(RichText::new(value).strong().size(18.0));
    });
    ui.add_space(16.0);
}

fn category_color(theme: &Theme, category: OptimizationCategory) -> Color32 {
    match category {
        OptimizationCategory::Retirement => theme.warning,
        OptimizationCategory::Investment => theme.accent_muted,
        OptimizationCategory::RealEstate => theme.success,
        OptimizationCategory::TaxRegime => theme.text_primary,
        OptimizationCategory::Family => theme.danger,
    }
}

fn complexity_color(theme: &Theme, complexity: Complexity) -> Color32 {
    match complexity {
        Complexity::Low => theme.success,
        Complexity::Medium => theme.warning,
        Complexity::High => theme.danger,
    }
}

impl eframe::App for OptiTaxApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);
        self.collect_dropped_files(ctx);
        self.render_top_bar(ctx);
        self.render_central(ctx);

        if self.workflow.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
