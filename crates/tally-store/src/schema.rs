//! Table definitions.
//!
//! Amounts are stored as decimal strings and line items and gateway data as
//! JSON; both are decoded and checked again whenever a row is read.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Result;

/// SQL to create the businesses table.
pub const CREATE_BUSINESS_TABLE_SQL: &str = r"
CREATE TABLE IF NOT EXISTS businesses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    name VARCHAR(200) NOT NULL,
    email VARCHAR(254) NOT NULL,
    phone VARCHAR(40),
    address TEXT NOT NULL DEFAULT '',
    tax_id VARCHAR(50),
    logo TEXT,
    signature TEXT,
    default_currency CHAR(3) NOT NULL DEFAULT 'USD',
    invoice_prefix VARCHAR(12) NOT NULL DEFAULT 'INV-',
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL
)
";

/// SQL to create the clients table.
pub const CREATE_CLIENT_TABLE_SQL: &str = r"
CREATE TABLE IF NOT EXISTS clients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    business_name VARCHAR(200) NOT NULL,
    contact_name VARCHAR(100) NOT NULL DEFAULT '',
    email VARCHAR(254) NOT NULL,
    phone VARCHAR(40),
    address TEXT NOT NULL DEFAULT '',
    tax_id VARCHAR(50),
    notes TEXT,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL
)
";

/// SQL to create the catalog items table.
pub const CREATE_ITEM_TABLE_SQL: &str = r"
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name VARCHAR(200) NOT NULL,
    description TEXT,
    unit_price TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL
)
";

/// SQL to create the payment accounts table.
pub const CREATE_PAYMENT_ACCOUNT_TABLE_SQL: &str = r"
CREATE TABLE IF NOT EXISTS payment_accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    gateway VARCHAR(20) NOT NULL,
    label VARCHAR(100) NOT NULL,
    account_data TEXT NOT NULL,
    is_default BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL
)
";

/// At most one default account per user.
pub const CREATE_DEFAULT_ACCOUNT_INDEX_SQL: &str = r"
CREATE UNIQUE INDEX IF NOT EXISTS payment_accounts_one_default
ON payment_accounts (user_id) WHERE is_default
";

/// SQL to create the invoices table.
pub const CREATE_INVOICE_TABLE_SQL: &str = r"
CREATE TABLE IF NOT EXISTS invoices (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    business_id INTEGER NOT NULL REFERENCES businesses(id),
    client_id INTEGER NOT NULL REFERENCES clients(id),
    invoice_number VARCHAR(32) NOT NULL,
    status VARCHAR(10) NOT NULL DEFAULT 'draft',
    issue_date DATE NOT NULL,
    due_date DATE NOT NULL,
    currency CHAR(3) NOT NULL,
    line_items TEXT NOT NULL DEFAULT '[]',
    discount_kind VARCHAR(10) NOT NULL DEFAULT 'flat',
    discount_value TEXT NOT NULL DEFAULT '0',
    tax_kind VARCHAR(10) NOT NULL DEFAULT 'flat',
    tax_value TEXT NOT NULL DEFAULT '0',
    tax_base VARCHAR(20) NOT NULL DEFAULT 'subtotal',
    subtotal TEXT NOT NULL,
    discount_amount TEXT NOT NULL,
    tax_amount TEXT NOT NULL,
    total TEXT NOT NULL,
    notes TEXT,
    terms TEXT,
    payment_account_id INTEGER REFERENCES payment_accounts(id),
    template VARCHAR(10) NOT NULL DEFAULT 'classic',
    sent_at TIMESTAMP,
    paid_at TIMESTAMP,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL,
    UNIQUE (business_id, invoice_number)
)
";

/// Creates every table, including the authentication tables.
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    tally_auth::create_tables(pool).await?;

    for sql in [
        CREATE_BUSINESS_TABLE_SQL,
        CREATE_CLIENT_TABLE_SQL,
        CREATE_ITEM_TABLE_SQL,
        CREATE_PAYMENT_ACCOUNT_TABLE_SQL,
        CREATE_DEFAULT_ACCOUNT_INDEX_SQL,
        CREATE_INVOICE_TABLE_SQL,
    ] {
        sqlx::query(sql).execute(pool).await?;
    }
    debug!("schema ready");
    Ok(())
}
