use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wonderful_gateway::application::gateway::PaymentGateway;
use wonderful_gateway::application::transition::{OrderAction, RedirectTarget};
use wonderful_gateway::config::GatewaySettings;
use wonderful_gateway::domain::payment::WonderfulPaymentId;
use wonderful_gateway::domain::ports::{NoticeSinkBox, OrderStoreBox, ProviderApiBox};
use wonderful_gateway::infrastructure::http::WonderfulClient;
use wonderful_gateway::infrastructure::in_memory::{InMemoryNoticeSink, InMemoryOrderStore};
use wonderful_gateway::interfaces::csv::bank_writer::BankWriter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (TOML). `WONDERFUL_*` environment variables override it.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the banks a payer can choose, as CSV
    Banks {
        /// Include banks that are not currently online
        #[arg(long)]
        all: bool,
    },
    /// Show how a payment would be reconciled, without changing anything
    Status {
        /// The provider's payment identifier
        payment_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = GatewaySettings::load(cli.config.as_deref()).into_diagnostic()?;

    let provider: ProviderApiBox = Box::new(WonderfulClient::new(&settings).into_diagnostic()?);
    let orders: OrderStoreBox = Box::new(InMemoryOrderStore::new());
    let notices: NoticeSinkBox = Box::new(InMemoryNoticeSink::new());
    let gateway = PaymentGateway::new(settings, orders, provider, notices);

    match cli.command {
        Command::Banks { all } => {
            let banks = if all {
                gateway.supported_banks().await
            } else {
                gateway.selectable_banks().await
            }
            .into_diagnostic()?;

            let stdout = io::stdout();
            let mut writer = BankWriter::new(stdout.lock());
            writer.write_banks(&banks).into_diagnostic()?;
        }
        Command::Status { payment_id } => {
            let payment_id = WonderfulPaymentId::new(&payment_id).into_diagnostic()?;
            let preview = gateway.preview_status(&payment_id).await.into_diagnostic()?;

            println!("reference: {}", preview.report.payment_reference);
            println!("order: {}", preview.order_id);
            println!("provider status: {}", preview.report.status);
            println!("bank: {}", preview.report.selected_aspsp.as_deref().unwrap_or("unknown"));
            match &preview.transition.action {
                OrderAction::CompletePayment => {
                    println!("action: complete payment");
                }
                OrderAction::SetStatus { status, reason } => {
                    println!("action: set status {status} ({reason})");
                }
            }
            println!(
                "redirect: {}",
                match preview.transition.redirect {
                    RedirectTarget::ReturnPage => "return page",
                    RedirectTarget::CheckoutPayment => "checkout payment page",
                }
            );
        }
    }

    Ok(())
}
