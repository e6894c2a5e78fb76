//! Simulated checkout from the command line.
//!
//! Card details are taken as arguments and wrapped in `SecretString` as soon
//! as they are parsed. Only the last four digits are logged.

use clap::Args;
use secrecy::SecretString;
use tracing::info;

use shopfront_cart::checkout::{PaymentDetails, ShippingAddress};
use shopfront_cart::{CartEngine, CheckoutForm, FileStore, PricingConfig, place_order};

/// Shipping and payment fields for `sf-cli checkout`.
#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, default_value = "")]
    pub phone: String,

    /// Street address
    #[arg(long)]
    pub address: String,

    #[arg(long)]
    pub city: String,

    #[arg(long)]
    pub state: String,

    #[arg(long)]
    pub zip_code: String,

    /// Defaults to the United States
    #[arg(long, default_value = "")]
    pub country: String,

    /// Card number (spaces and dashes are ignored)
    #[arg(long)]
    pub card_number: String,

    /// Card expiry as MM/YY
    #[arg(long)]
    pub expiry_date: String,

    #[arg(long)]
    pub cvv: String,

    /// Name printed on the card
    #[arg(long)]
    pub card_name: String,
}

impl From<CheckoutArgs> for CheckoutForm {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            shipping: ShippingAddress {
                first_name: args.first_name,
                last_name: args.last_name,
                email: args.email,
                phone: args.phone,
                address: args.address,
                city: args.city,
                state: args.state,
                zip_code: args.zip_code,
                country: args.country,
            },
            payment: PaymentDetails {
                card_number: SecretString::from(args.card_number),
                expiry_date: args.expiry_date,
                cvv: SecretString::from(args.cvv),
                card_name: args.card_name,
            },
        }
    }
}

/// Place an order for the saved cart.
///
/// # Errors
///
/// Returns an error if the cart is empty or a field fails validation. The
/// cart is left as it was in that case.
pub fn run(
    cart: &mut CartEngine<FileStore>,
    args: CheckoutArgs,
    pricing: &PricingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let form = CheckoutForm::from(args);
    let confirmation = place_order(cart, &form, pricing)?;

    info!("Order {} confirmed", confirmation.order_number);
    info!("Ship to: {} ({})", confirmation.ship_to, confirmation.country);
    info!("Receipt sent to {}", confirmation.email);
    for item in &confirmation.items {
        info!(
            "  [{}] {} x {} = {}",
            item.id,
            item.name.as_deref().unwrap_or("(unnamed)"),
            item.quantity(),
            item.line_total()
        );
    }
    info!("Subtotal: {}", confirmation.summary.subtotal);
    info!("Shipping: {}", confirmation.summary.shipping);
    info!("Tax:      {}", confirmation.summary.tax);
    info!("Total:    {}", confirmation.summary.total);
    info!("Charged card ending in {}", confirmation.card_last4);

    Ok(())
}
