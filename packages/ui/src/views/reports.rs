use api::queries;
use chrono::Local;
use dioxus::prelude::*;
use portal::Report;
use tracing::info;

use crate::icons::FaDownload;
use crate::{download_csv, report_error, use_backend, use_capabilities, use_toasts, EmptyState, Icon};

/// CSV downloads of members, dues, finance and activities.
#[component]
pub fn ReportsView() -> Element {
    let caps = use_capabilities();

    rsx! {
        section {
            class: "view reports",
            h1 { "Reports" }
            if caps.can_view_reports {
                div {
                    class: "report-list",
                    for report in Report::ALL {
                        ReportCard { key: "{report.slug()}", report }
                    }
                }
            } else {
                EmptyState { message: "Reports are available to the board only." }
            }
        }
    }
}

#[component]
fn ReportCard(report: Report) -> Element {
    let client = use_backend();
    let toasts = use_toasts();
    let mut busy = use_signal(|| false);

    let onclick = move |_| {
        let client = client.clone();
        async move {
            busy.set(true);
            let filename = report.filename(Local::now().date_naive());
            let csv = match queries::fetch_report(&client, report).await {
                Ok(csv) => csv,
                Err(e) => {
                    report_error(&format!("Exporting {}", report.title()), &e, true);
                    busy.set(false);
                    return;
                }
            };
            match download_csv(&filename, &csv) {
                Ok(()) => {
                    info!("exported {filename}");
                    toasts.success(format!("Downloaded {filename}"));
                }
                Err(e) => {
                    report_error("Saving download", &e, true);
                }
            }
            busy.set(false);
        }
    };

    rsx! {
        div {
            class: "report-card",
            h2 { {report.title()} }
            button {
                class: "primary",
                disabled: busy(),
                onclick: onclick,
                Icon { width: 14, height: 14, icon: FaDownload }
                if busy() { "Preparing..." } else { "Download CSV" }
            }
        }
    }
}
