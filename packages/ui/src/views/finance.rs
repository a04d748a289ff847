use api::queries;
use chrono::{Datelike, Utc};
use dioxus::prelude::*;
use portal::aggregate::{month_short_name, monthly_series};
use portal::export::{finance_ledger, FinanceLine};
use portal::format::currency;
use portal::FinanceSummary;

use crate::{or_default, use_backend, use_capabilities, BarChart, EmptyState, Loading, StatCard};

#[derive(Clone, Debug, Default, PartialEq)]
struct FinanceData {
    summary: FinanceSummary,
    monthly_dues: Vec<f64>,
    ledger: Vec<FinanceLine>,
}

/// Income, expenses and this year's dues.
#[component]
pub fn FinanceView() -> Element {
    let client = use_backend();
    let caps = use_capabilities();
    let prefix = client.config().display.currency_prefix.clone();
    let mut data = use_signal(|| Option::<FinanceData>::None);

    let _loader = use_resource(move || {
        let client = client.clone();
        async move {
            let year = Utc::now().year();
            let (summary, dues, income, expenses) = futures::join!(
                queries::fetch_finance_summary(&client),
                queries::fetch_dues_for_year(&client, year),
                queries::fetch_income(&client),
                queries::fetch_expenses(&client),
            );
            let dues = or_default("Loading dues", dues);
            let income = or_default("Loading income", income);
            let expenses = or_default("Loading expenses", expenses);
            data.set(Some(FinanceData {
                summary: or_default("Loading finance summary", summary),
                monthly_dues: monthly_series(&dues, year).to_vec(),
                ledger: finance_ledger(&income, &expenses),
            }));
        }
    });

    let Some(data) = data() else {
        return rsx! { Loading {} };
    };
    let summary = data.summary;
    let labels: Vec<String> = (1..=12).map(|m| month_short_name(m).to_string()).collect();
    let balance_tone = if summary.balance < 0.0 { "stat-card--warning" } else { "" };

    rsx! {
        section {
            class: "view finance",
            h1 { "Finance" }
            div {
                class: "stat-grid",
                StatCard { label: "Dues collected", value: currency(summary.dues_total, &prefix) }
                StatCard { label: "Other income", value: currency(summary.other_income, &prefix) }
                StatCard { label: "Total income", value: currency(summary.total_income, &prefix) }
                StatCard { label: "Expenses", value: currency(summary.total_expenses, &prefix) }
                StatCard { label: "Balance", value: currency(summary.balance, &prefix), tone: balance_tone }
            }
            div {
                class: "panel",
                BarChart {
                    title: "Dues per month",
                    values: data.monthly_dues.clone(),
                    labels,
                    prefix: prefix.clone(),
                }
            }
            div {
                class: "panel",
                h2 { "Ledger" }
                if caps.can_manage_finances {
                    p { class: "muted", "Entries are recorded by the treasurer in the backend console." }
                }
                if data.ledger.is_empty() {
                    EmptyState { message: "No income or expenses recorded yet." }
                } else {
                    table {
                        class: "table",
                        thead {
                            tr {
                                th { "Date" }
                                th { "Type" }
                                th { "Description" }
                                th { class: "numeric", "Amount" }
                            }
                        }
                        tbody {
                            for (idx, line) in data.ledger.iter().enumerate().rev() {
                                tr {
                                    key: "{idx}",
                                    td { {line.date.format("%d %b %Y").to_string()} }
                                    td { "{line.kind}" }
                                    td { "{line.description}" }
                                    td { class: "numeric", {currency(line.amount, &prefix)} }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
