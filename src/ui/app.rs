use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::common::SocketEvent;

use super::client::ChatClient;
use super::components::{chat_area, input_bar};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct ChatApp {
    client: ChatClient,
    event_receiver: mpsc::Receiver<SocketEvent>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        client: ChatClient,
        event_receiver: mpsc::Receiver<SocketEvent>,
    ) -> Self {
        Self {
            client,
            event_receiver,
        }
    }

    fn handle_socket_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.client.handle_event(event);
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_socket_events();

        egui::TopBottomPanel::top("patient_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Patient Chat");
                ui.separator();
                ui.label("Patient ID:");
                ui.label(egui::RichText::new(self.client.patient_id()).monospace());
            });
        });

        egui::TopBottomPanel::bottom("chat_form").show(ctx, |ui| {
            ui.add_space(4.0);
            if input_bar::render(ui, &mut self.client.state_mut().input_text) {
                self.client.submit();
            }
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            chat_area::render(ui, self.client.state_mut());
        });

        // Sự kiện socket đến từ task khác; định kỳ vẽ lại để đọc chúng.
        ctx.request_repaint_after(EVENT_POLL_INTERVAL);
    }
}
