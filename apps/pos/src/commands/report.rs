//! # Report Commands
//!
//! ## Loading
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  no session ──► ReportData::empty() + "authentication required"         │
//! │                 (nothing sent)                                          │
//! │                                                                         │
//! │  attempt n:  products ──► suppliers ──► sales                           │
//! │                 │ any step fails                                        │
//! │                 ├── auth error ──────────────► give up now              │
//! │                 └── otherwise  ── wait 1s, 2s, 4s ──► attempt n+1       │
//! │                                                                         │
//! │  after 4 attempts ──► ReportData::empty() + notification (attempts)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The page stays usable whatever happens; loading never returns an error.

use idcashier_client::retry::retry_with_backoff;
use idcashier_client::{ClientError, ClientResult, Session, SupabaseClient};
use idcashier_core::permissions::Capability;
use idcashier_core::report::{
    daily_profit_loss, export_profit_loss, export_transactions, filter_options, DailyProfitLoss, FilterOptions,
    ProfitLossExportRow, TransactionExportRow, PROFIT_LOSS_SHEET, TRANSACTIONS_SHEET,
};
use idcashier_core::{ReportData, ReportFilter, ReportRow, ReportStats, RetryPolicy};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ApiResult, Notification};
use crate::i18n::{report_labels, translate, Language, MessageKey};
use crate::state::SessionState;

/// Loaded report data and the toast to show, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLoad {
    pub data: ReportData,
    pub notification: Option<Notification>,
}

async fn fetch_report_data(client: &SupabaseClient, session: &Session) -> ClientResult<ReportData> {
    let products = client.list_products(session).await?;
    let suppliers = client.list_suppliers(session).await?;
    let sales = client.list_sales(session).await?;
    Ok(ReportData {
        products,
        suppliers,
        sales,
    })
}

/// Loads products, suppliers and sales with the default retry policy.
pub async fn load_report(client: &SupabaseClient, session: &SessionState, language: Language) -> ReportLoad {
    load_report_with(client, session, language, &RetryPolicy::default()).await
}

pub(crate) async fn load_report_with(
    client: &SupabaseClient,
    session: &SessionState,
    language: Language,
    policy: &RetryPolicy,
) -> ReportLoad {
    let Some(current) = session.current() else {
        warn!("Report requested without a session");
        return ReportLoad {
            data: ReportData::empty(),
            notification: Some(Notification::error(
                language,
                translate(language, MessageKey::AuthenticationRequired),
            )),
        };
    };

    let result = retry_with_backoff(
        policy,
        |err: &ClientError| !err.is_auth_error(),
        |attempt| {
            debug!(attempt = attempt + 1, "Loading report data");
            fetch_report_data(client, &current)
        },
    )
    .await;

    match result {
        Ok(data) => {
            info!(sales = data.sales.len(), products = data.products.len(), "Report data loaded");
            ReportLoad {
                data,
                notification: None,
            }
        }
        Err(exhausted) => {
            warn!(attempts = exhausted.attempts, error = %exhausted.last_error, "Report load gave up");
            let body = format!(
                "{} ({}x): {}",
                translate(language, MessageKey::ReportLoadFailed),
                exhausted.attempts,
                exhausted.last_error
            );
            ReportLoad {
                data: ReportData::empty(),
                notification: Some(Notification::error(language, body)),
            }
        }
    }
}

// =============================================================================
// View
// =============================================================================

/// Everything the report page renders for one filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub rows: Vec<ReportRow>,
    pub stats: ReportStats,
    pub options: FilterOptions,
    pub daily: Vec<DailyProfitLoss>,
}

/// Filter options come from all rows so the dropdowns don't shrink as the
/// user narrows the view.
pub fn build_report(data: &ReportData, filter: &ReportFilter, language: Language) -> ReportView {
    let all = data.rows(&report_labels(language));
    let rows = filter.apply(&all);
    ReportView {
        stats: ReportStats::compute(&rows),
        options: filter_options(&all, &data.suppliers),
        daily: daily_profit_loss(&rows),
        rows,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Transactions,
    ProfitLoss,
}

impl ExportKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "transactions" => Some(ExportKind::Transactions),
            "profit-loss" | "profit_loss" => Some(ExportKind::ProfitLoss),
            _ => None,
        }
    }
}

/// A named sheet ready for a spreadsheet writer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReportExport {
    Transactions {
        sheet: &'static str,
        rows: Vec<TransactionExportRow>,
    },
    ProfitLoss {
        sheet: &'static str,
        rows: Vec<ProfitLossExportRow>,
    },
}

/// Needs `canExportReports`.
pub fn export_report(
    session: &SessionState,
    data: &ReportData,
    filter: &ReportFilter,
    language: Language,
    kind: ExportKind,
) -> ApiResult<ReportExport> {
    session.require_capability(Capability::CanExportReports)?;
    let rows = filter.apply(&data.rows(&report_labels(language)));
    debug!(rows = rows.len(), ?kind, "Exporting report");
    Ok(match kind {
        ExportKind::Transactions => ReportExport::Transactions {
            sheet: TRANSACTIONS_SHEET,
            rows: export_transactions(&rows),
        },
        ExportKind::ProfitLoss => ReportExport::ProfitLoss {
            sheet: PROFIT_LOSS_SHEET,
            rows: export_profit_loss(&rows),
        },
    })
}

/// Deletes the selected sales one at a time, then reloads the report.
///
/// Needs `canDeleteTransaction`. The first failure stops the batch.
pub async fn delete_sales(
    client: &SupabaseClient,
    session: &SessionState,
    language: Language,
    sale_ids: &[String],
) -> ApiResult<ReportLoad> {
    let current = session.require_capability(Capability::CanDeleteTransaction)?;

    let mut deleted = 0usize;
    let mut failure = None;
    for id in sale_ids {
        match client.delete_sale(&current, id).await {
            Ok(()) => deleted += 1,
            // An expired session cannot reload either.
            Err(err) if err.is_auth_error() => return Err(err.into()),
            Err(err) => {
                warn!(sale_id = %id, deleted, error = %err, "Sale delete failed");
                failure = Some(err);
                break;
            }
        }
    }
    info!(deleted, requested = sale_ids.len(), "Sales deleted");

    let mut reloaded = load_report(client, session, language).await;
    match failure {
        Some(err) => {
            let body = format!(
                "{} ({}/{}): {}",
                translate(language, MessageKey::TransactionsDeletePartial),
                deleted,
                sale_ids.len(),
                err
            );
            reloaded.notification = Some(Notification::error(language, body));
        }
        None if reloaded.notification.is_none() => {
            reloaded.notification = Some(Notification::success(language, MessageKey::TransactionsDeleted));
        }
        None => {}
    }
    Ok(reloaded)
}
