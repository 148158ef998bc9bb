//! # idcashier
//!
//! Command-line shell over `idcashier_pos`. Every subcommand prints its
//! view model as JSON on stdout; notifications and logs go to stderr.
//!
//! ```text
//! idcashier login --email sari@toko.id --password ******
//! idcashier checkout --item p1:2 --item p2:1 --discount 10 --tax 11 --pay 50000
//! idcashier report --from 2024-05-01 --to 2024-05-31 --export transactions
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use idcashier_client::BackendConfig;
use idcashier_core::receipt::PaperSize;
use idcashier_core::{Money, Percent, ReportFilter, Role};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use idcashier_pos::commands::{
    auth, cart, catalog, dashboard, navigation, report, sale, settings, subscription,
};
use idcashier_pos::{init_tracing, ApiError, ApiResult, App, Language, MessageKey, Notification};

#[derive(Parser)]
#[command(name = "idcashier", about = "idCashier point of sale", version)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "IDCASHIER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "IDCASHIER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "IDCASHIER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    Logout,
    Whoami,
    Products,
    Customers,
    Checkout(CheckoutArgs),
    Report(ReportArgs),
    DeleteSales {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    Invoice {
        sale_id: String,
    },
    Subscription,
    Dashboard,
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// id, en or zh
    Language {
        code: String,
    },
}

#[derive(Args)]
struct CheckoutArgs {
    /// `productId:qty`, repeatable
    #[arg(long = "item", required = true, value_parser = parse_item)]
    items: Vec<(String, i64)>,
    #[arg(long, default_value = "0")]
    discount: Decimal,
    #[arg(long, default_value = "0")]
    tax: Decimal,
    #[arg(long)]
    pay: Decimal,
    /// Customer id; walk-in when omitted
    #[arg(long)]
    customer: Option<String>,
}

#[derive(Args)]
struct ReportArgs {
    #[arg(long)]
    from: Option<NaiveDate>,
    #[arg(long)]
    to: Option<NaiveDate>,
    #[arg(long)]
    product: Option<String>,
    #[arg(long)]
    customer: Option<String>,
    #[arg(long)]
    supplier: Option<String>,
    #[arg(long)]
    hide_corrupt: bool,
    /// transactions | profit-loss
    #[arg(long)]
    export: Option<String>,
}

#[derive(Subcommand)]
enum SettingsCommand {
    Show,
    SetStore {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        logo: Option<String>,
    },
    SetReceipt {
        /// 58mm, 80mm or A4
        #[arg(long)]
        paper: Option<String>,
        #[arg(long)]
        header: Option<String>,
        #[arg(long)]
        footer: Option<String>,
        #[arg(long)]
        margin: Option<u32>,
        #[arg(long)]
        two_decimals: Option<bool>,
    },
}

fn parse_item(raw: &str) -> Result<(String, i64), String> {
    let (id, qty) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected productId:qty, got '{raw}'"))?;
    let qty = qty.trim().parse::<i64>().map_err(|e| format!("bad quantity in '{raw}': {e}"))?;
    if id.trim().is_empty() {
        return Err(format!("missing product id in '{raw}'"));
    }
    Ok((id.trim().to_string(), qty))
}

fn print_json<T: Serialize>(value: &T) -> ApiResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| ApiError::internal(e.to_string()))?;
    println!("{text}");
    Ok(())
}

fn notify(notification: &Notification) {
    match serde_json::to_string(notification) {
        Ok(text) => eprintln!("{text}"),
        Err(_) => eprintln!("{}: {}", notification.title, notification.body),
    }
}

async fn checkout(app: &App, args: CheckoutArgs) -> ApiResult<()> {
    let language = app.language();
    catalog::load_sales_page(&app.client, &app.session, &app.catalog).await?;

    cart::clear_cart(&app.cart);
    for (product_id, qty) in &args.items {
        cart::add_to_cart(&app.cart, &app.catalog, product_id)?;
        cart::set_quantity(&app.cart, product_id, *qty)?;
    }
    let mut updates = Vec::with_capacity(2);
    if !args.discount.is_zero() {
        updates.push(cart::set_discount(&app.session, &app.cart, Percent::new(args.discount))?);
    }
    if !args.tax.is_zero() {
        updates.push(cart::set_tax(&app.session, &app.cart, Percent::new(args.tax))?);
    }
    for warning in updates.into_iter().filter_map(|u| u.warning) {
        notify(&cart::clamp_notification(language, warning));
    }
    cart::select_customer(&app.cart, args.customer);
    cart::set_payment(&app.cart, Money::new(args.pay));

    let result = sale::process_payment(
        &app.client,
        &app.session,
        &app.cart,
        &app.catalog,
        &app.preferences,
        Utc::now(),
    )
    .await;

    match result {
        Ok(Some(done)) => {
            eprintln!("{}", done.receipt_text);
            print_json(&done)
        }
        Ok(None) => Ok(()),
        Err(err) => {
            notify(&sale::checkout_failure_notification(language, &err));
            Err(err)
        }
    }
}

async fn show_report(app: &App, args: ReportArgs) -> ApiResult<()> {
    let language = app.language();
    let load = report::load_report(&app.client, &app.session, language).await;
    if let Some(n) = &load.notification {
        notify(n);
    }

    let filter = ReportFilter {
        from: args.from,
        to: args.to,
        product: args.product,
        customer: args.customer,
        supplier: args.supplier,
        hide_corrupt: args.hide_corrupt,
    };

    match args.export.as_deref() {
        Some(raw) => {
            let kind = report::ExportKind::parse(raw)
                .ok_or_else(|| ApiError::validation(format!("Jenis ekspor tidak dikenal: {raw}")))?;
            print_json(&report::export_report(&app.session, &load.data, &filter, language, kind)?)
        }
        None => print_json(&report::build_report(&load.data, &filter, language)),
    }
}

fn run_settings(app: &App, command: SettingsCommand) -> ApiResult<()> {
    let current = settings::get_settings(&app.session, &app.preferences)?;
    match command {
        SettingsCommand::Show => print_json(&current),
        SettingsCommand::SetStore {
            name,
            address,
            phone,
            logo,
        } => {
            let mut store = current.store;
            if let Some(v) = name {
                store.name = v;
            }
            if let Some(v) = address {
                store.address = v;
            }
            if let Some(v) = phone {
                store.phone = v;
            }
            if logo.is_some() {
                store.logo = logo;
            }
            print_json(&settings::set_store_settings(&app.session, &app.preferences, store)?)
        }
        SettingsCommand::SetReceipt {
            paper,
            header,
            footer,
            margin,
            two_decimals,
        } => {
            let mut receipt = current.receipt;
            if let Some(raw) = paper {
                receipt.paper_size = PaperSize::parse(&raw)
                    .ok_or_else(|| ApiError::validation(format!("Ukuran kertas tidak dikenal: {raw}")))?;
            }
            if let Some(v) = header {
                receipt.show_header = !v.trim().is_empty();
                receipt.header_text = v;
            }
            if let Some(v) = footer {
                receipt.show_footer = !v.trim().is_empty();
                receipt.footer_text = v;
            }
            if let Some(v) = margin {
                receipt.margin = v;
            }
            if let Some(v) = two_decimals {
                receipt.use_two_decimals = v;
            }
            print_json(&settings::set_receipt_settings(&app.session, &app.preferences, receipt)?)
        }
    }
}

async fn run(app: &App, command: Command) -> ApiResult<()> {
    let prefs = &app.preferences;

    if !matches!(command, Command::Login { .. } | Command::Register { .. }) {
        let restored = auth::restore_session(&app.client, &app.session, prefs, Utc::now()).await?;
        debug!(signed_in = restored.is_some(), "Session restored");
    }

    match command {
        Command::Login { email, password } => {
            print_json(&auth::login(&app.client, &app.session, prefs, &email, &password).await?)
        }
        Command::Register { name, email, password } => print_json(
            &auth::register(&app.client, &app.session, prefs, &name, &email, &password, Some(Role::Owner)).await?,
        ),
        Command::ForgotPassword { email } => {
            auth::request_password_reset(&app.client, &email).await?;
            notify(&Notification::success(app.language(), MessageKey::PasswordResetSent));
            Ok(())
        }
        Command::Logout => {
            auth::logout(&app.client, &app.session, &app.cart, &app.catalog, prefs).await?;
            notify(&Notification::success(app.language(), MessageKey::LoggedOut));
            Ok(())
        }
        Command::Whoami => print_json(&auth::whoami(&app.client, &app.session)?),
        Command::Products => print_json(&catalog::list_products(&app.client, &app.session, &app.catalog).await?),
        Command::Customers => print_json(&catalog::list_customers(&app.client, &app.session, &app.catalog).await?),
        Command::Checkout(args) => checkout(app, args).await,
        Command::Report(args) => show_report(app, args).await,
        Command::DeleteSales { ids } => {
            let load = report::delete_sales(&app.client, &app.session, app.language(), &ids).await?;
            if let Some(n) = &load.notification {
                notify(n);
            }
            Ok(())
        }
        Command::Invoice { sale_id } => {
            let (invoice, text) = sale::get_invoice(&app.client, &app.session, prefs, &sale_id).await?;
            eprintln!("{text}");
            print_json(&invoice)
        }
        Command::Subscription => print_json(
            &subscription::get_subscription(&app.client, &app.session, Utc::now().date_naive()).await?,
        ),
        Command::Dashboard => print_json(&dashboard::load_dashboard(&app.client, &app.session).await?),
        Command::Settings(command) => run_settings(app, command),
        Command::Language { code } => print_json(&navigation::set_language(prefs, &code)?),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let app = match BackendConfig::load(cli.config).map_err(ApiError::from).and_then(App::new) {
        Ok(app) => app,
        Err(err) => {
            notify(&err.notification(Language::default()));
            return ExitCode::FAILURE;
        }
    };

    match run(&app, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            notify(&err.notification(app.language()));
            ExitCode::FAILURE
        }
    }
}
