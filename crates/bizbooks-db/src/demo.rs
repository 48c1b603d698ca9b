//! # Demo Data
//!
//! Fills an empty database with a small, believable set of records for
//! development and screenshots. Used by the host shell's `seed` command.
//!
//! ## What Gets Created
//! - Two companies, each with a bank account
//! - A handful of customers
//! - Products across a few catalogue categories, each with one batch
//! - Opening stock movements for every product
//! - Invoices, one quotation and one delivery challan for the first company
//! - A receipt voucher
//!
//! Document numbers come from the repositories, so the data looks like it
//! was entered by hand.

use serde::Serialize;
use tracing::{debug, info};

use crate::engine::Database;
use crate::error::DbResult;
use bizbooks_core::{
    Company, Customer, DeliveryChallan, InventoryTransaction, Invoice, LineItem, MovementType,
    Product, Quotation, TransferReason, Voucher, VoucherType,
};

/// Catalogue categories: (HSN code, unit, product names).
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "7318",
        "Nos",
        &[
            "Hex Bolt M8",
            "Hex Bolt M10",
            "Hex Nut M8",
            "Spring Washer",
            "Anchor Fastener",
        ],
    ),
    (
        "8481",
        "Nos",
        &["Ball Valve 1/2\"", "Gate Valve 1\"", "Check Valve 3/4\"", "Needle Valve"],
    ),
    (
        "3917",
        "Mtr",
        &["PVC Pipe 20mm", "PVC Pipe 25mm", "HDPE Pipe 32mm", "Braided Hose"],
    ),
    (
        "2710",
        "Ltr",
        &["Cutting Oil", "Hydraulic Oil 68", "Gear Oil 90"],
    ),
];

const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Sharma Engineering Works", "Plot 14, MIDC Bhosari, Pune", "Maharashtra"),
    ("Patel Hardware Stores", "Station Road, Anand", "Gujarat"),
    ("Krishna Fabricators", "Peenya 2nd Stage, Bengaluru", "Karnataka"),
    ("Noor Pumps & Motors", "GT Road, Ludhiana", "Punjab"),
];

/// How much demo data to create.
#[derive(Debug, Clone, Copy)]
pub struct DemoOptions {
    /// Upper bound on generated products.
    pub products: usize,
    /// Invoices for the first company.
    pub invoices: usize,
}

impl Default for DemoOptions {
    fn default() -> Self {
        DemoOptions {
            products: 12,
            invoices: 3,
        }
    }
}

/// What [`seed_demo`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSummary {
    /// True when the database already had companies and nothing was added.
    pub skipped: bool,
    pub companies: usize,
    pub customers: usize,
    pub products: usize,
    pub invoices: usize,
    pub quotations: usize,
    pub challans: usize,
    pub vouchers: usize,
    pub stock_movements: usize,
}

/// Writes demo records into `db` unless it already has companies.
///
/// Does not persist; the caller saves through the controller.
pub async fn seed_demo(db: &Database, options: &DemoOptions) -> DbResult<DemoSummary> {
    let existing = db.companies().count().await?;
    if existing > 0 {
        info!(companies = existing, "Database already has data, demo seed skipped");
        return Ok(DemoSummary {
            skipped: true,
            ..DemoSummary::default()
        });
    }

    let mut summary = DemoSummary::default();

    // Companies
    let main = demo_company(
        "Shree Ganesh Industrial Supplies",
        "27AAFCS1234K1Z5",
        "Maharashtra",
    )?;
    let branch = demo_company("Ganesh Traders (Surat)", "24AAFCS1234K1Z9", "Gujarat")?;
    for company in [&main, &branch] {
        db.companies().save(company).await?;
        summary.companies += 1;
    }

    // Customers
    let mut customers = Vec::with_capacity(CUSTOMERS.len());
    for (name, address, state) in CUSTOMERS {
        let mut customer = Customer::new(*name)?;
        customer.address = Some(address.to_string());
        customer.state = Some(state.to_string());
        db.customers().save(&customer).await?;
        customers.push(customer);
    }
    summary.customers = customers.len();

    // Products, batches and opening stock
    let products = demo_products(options.products)?;
    for (index, product) in products.iter().enumerate() {
        db.products().save(product).await?;

        let opening = 20.0 + (index % 5) as f64 * 10.0;
        let movement = InventoryTransaction::new(product, MovementType::In, opening, "OPENING")?;
        db.inventory().record_transaction(&movement).await?;
        summary.stock_movements += 1;
    }
    summary.products = products.len();

    if products.is_empty() || customers.is_empty() {
        return Ok(summary);
    }

    // Invoices, each issuing stock out
    for n in 0..options.invoices {
        let number = db.invoices().next_number(Some(main.id.as_str())).await?;
        let mut invoice = Invoice::new(number, None)?;
        invoice.apply_company(&main);
        invoice.apply_customer(&customers[n % customers.len()]);
        invoice.items = demo_items(&products, n, 2);
        invoice.apply_totals();
        db.invoices().save(&invoice).await?;
        summary.invoices += 1;

        for item in &invoice.items {
            let Some(product) = products
                .iter()
                .find(|p| Some(&p.id) == item.product_id.as_ref())
            else {
                continue;
            };
            let movement = InventoryTransaction::new(
                product,
                MovementType::Out,
                item.quantity,
                invoice.invoice_number.clone(),
            )?;
            db.inventory().record_transaction(&movement).await?;
            summary.stock_movements += 1;
        }
        debug!(number = %invoice.invoice_number, total = invoice.total, "Demo invoice");
    }

    // One quotation
    let number = db.quotations().next_number(Some(main.id.as_str())).await?;
    let mut quotation = Quotation::new(number, None)?;
    quotation.apply_company(&main);
    quotation.apply_customer(&customers[0]);
    quotation.subject = Some("Supply of valves and fittings".to_string());
    quotation.items = demo_items(&products, 1, 3);
    quotation.apply_totals();
    db.quotations().save(&quotation).await?;
    summary.quotations = 1;

    // One delivery challan
    let number = db.challans().next_number(Some(main.id.as_str())).await?;
    let mut challan = DeliveryChallan::new(number, None)?;
    challan.apply_company(&main);
    challan.apply_customer(&customers[customers.len() - 1]);
    challan.reason_for_transfer = TransferReason::JobWork;
    challan.items = demo_items(&products, 2, 1);
    challan.apply_totals();
    db.challans().save(&challan).await?;
    summary.challans = 1;

    // One receipt
    let mut voucher = Voucher::new("RV-1", VoucherType::Receipt, 5000.0)?;
    voucher.company_id = Some(main.id.clone());
    voucher.party = Some(customers[0].name.clone());
    voucher.narration = "Advance against order".to_string();
    db.vouchers().save(&voucher).await?;
    summary.vouchers = 1;

    info!(
        companies = summary.companies,
        customers = summary.customers,
        products = summary.products,
        invoices = summary.invoices,
        "Demo data created"
    );
    Ok(summary)
}

fn demo_company(name: &str, gstin: &str, state: &str) -> DbResult<Company> {
    let mut company = Company::new(name)?;
    company.address = format!("Industrial Estate, {}", state);
    company.gstin = Some(gstin.to_string());
    company.state = Some(state.to_string());
    company.bank_name = Some("State Bank of India".to_string());
    company.ifsc_code = Some("SBIN0001234".to_string());
    Ok(company)
}

/// Generates up to `count` products with deterministic rates.
fn demo_products(count: usize) -> DbResult<Vec<Product>> {
    let mut products = Vec::with_capacity(count);

    for (category_idx, (hsn, unit, names)) in CATEGORIES.iter().enumerate() {
        for (product_idx, name) in names.iter().enumerate() {
            if products.len() >= count {
                return Ok(products);
            }
            let seed = category_idx * 100 + product_idx;

            // 10.00 - 259.50 in steps of 0.50
            let rate = 10.0 + ((seed * 37) % 500) as f64 * 0.5;

            let mut product = Product::new(*name, rate, *unit)?;
            product.hsn_sac = hsn.to_string();

            let batch = product.add_batch(format!("B{:04}", seed + 1), 0.0);
            batch.mfg_date = "2024-01-15".to_string();

            products.push(product);
        }
    }

    Ok(products)
}

/// `count` line items starting at a product picked by `offset`.
fn demo_items(products: &[Product], offset: usize, count: usize) -> Vec<LineItem> {
    (0..count)
        .map(|i| {
            let product = &products[(offset * 3 + i) % products.len()];
            let quantity = (i + 2) as f64;
            let mut item = LineItem::new((i + 1) as u32, product.name.clone(), quantity, product.rate)
                .with_discount(if i == 0 { 5.0 } else { 0.0 });
            item.product_id = Some(product.id.clone());
            item.hsn_sac = product.hsn_sac.clone();
            item.unit = product.unit.clone();
            item
        })
        .collect()
}
