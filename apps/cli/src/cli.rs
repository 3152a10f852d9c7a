//! # Console Menu
//!
//! The numbered menu the operator drives. Generic over its input and output
//! so tests can script a session.
//!
//! ```text
//! ══════════ PIZZA ORDERING ══════════
//!  1) Show menu
//!  2) Place order
//!  3) Add customer
//!  4) Show undelivered orders
//!  5) Mark order delivered
//!  0) Exit
//! ```
//!
//! Workflow errors are printed and the loop continues. End of input exits
//! like `0`.

use std::io::{self, BufRead, Write};

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use tracing::debug;

use crate::error::AppError;
use crate::workflow::{
    add_customer, list_customers, local_date, mark_delivered, place_order_on, OrderConfirmation,
    OrderLine, OrderRequest,
};
use pizza_core::PricedProduct;
use pizza_db::Database;

const WIDTH: usize = 48;

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    App(AppError),
    /// Input closed mid-prompt
    Eof,
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<AppError> for CliError {
    fn from(err: AppError) -> Self {
        CliError::App(err)
    }
}

type CliResult<T> = Result<T, CliError>;

/// Runs the menu loop until `0` or end of input.
pub async fn run_menu<R: BufRead, W: Write>(db: &Database, input: R, output: W) -> io::Result<()> {
    run_session(db, input, output, Utc::now).await
}

/// Same as [`run_menu`] with an explicit clock.
pub(crate) async fn run_session<R: BufRead, W: Write>(
    db: &Database,
    input: R,
    output: W,
    clock: fn() -> DateTime<Utc>,
) -> io::Result<()> {
    let mut console = Console {
        input,
        output,
        clock,
    };

    loop {
        console.menu()?;
        let choice = match console.prompt("Choice")? {
            Some(choice) => choice,
            None => break,
        };
        debug!(choice = %choice, "Menu choice");

        let result = match choice.as_str() {
            "1" => console.show_menu(db).await,
            "2" => console.place_order(db).await,
            "3" => console.add_customer(db).await,
            "4" => console.show_undelivered(db).await,
            "5" => console.mark_delivered(db).await,
            "0" => break,
            _ => {
                console.fail(&AppError::validation(format!("Unknown choice: {}", choice)))?;
                continue;
            }
        };

        match result {
            Ok(()) => {}
            Err(CliError::App(err)) => console.fail(&err)?,
            Err(CliError::Eof) => break,
            Err(CliError::Io(err)) => return Err(err),
        }
    }

    writeln!(console.output, "Bye.")?;
    console.output.flush()
}

struct Console<R, W> {
    input: R,
    output: W,
    clock: fn() -> DateTime<Utc>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    // -------------------------------------------------------------------------
    // Prompts
    // -------------------------------------------------------------------------

    /// Prints `label` and reads one trimmed line. `None` on end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}: ", label.bold())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask(&mut self, label: &str) -> CliResult<String> {
        self.prompt(label)?.ok_or(CliError::Eof)
    }

    fn ask_number(&mut self, label: &str) -> CliResult<i64> {
        let raw = self.ask(label)?;
        parse_number(label, &raw).map_err(CliError::App)
    }

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------

    fn header(&mut self, title: &str) -> io::Result<()> {
        let title = format!(" {} ", title.to_uppercase());
        let pad = WIDTH.saturating_sub(title.chars().count());
        let left = "═".repeat(pad / 2);
        let right = "═".repeat(pad - pad / 2);
        writeln!(
            self.output,
            "{}{}{}",
            left.bright_black(),
            title.bright_green().bold(),
            right.bright_black()
        )
    }

    fn menu(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        self.header("Pizza ordering")?;
        for (key, label) in [
            ("1", "Show menu"),
            ("2", "Place order"),
            ("3", "Add customer"),
            ("4", "Show undelivered orders"),
            ("5", "Mark order delivered"),
            ("0", "Exit"),
        ] {
            writeln!(self.output, " {}) {}", key.cyan(), label)?;
        }
        Ok(())
    }

    fn fail(&mut self, err: &AppError) -> io::Result<()> {
        writeln!(self.output, "{} {}", "✗".red().bold(), err.to_string().red())
    }

    fn ok(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{} {}", "✓".green().bold(), message)
    }

    fn print_menu(&mut self, products: &[PricedProduct]) -> io::Result<()> {
        let mut current: Option<&str> = None;
        for product in products {
            if current != Some(product.type_name.as_str()) {
                writeln!(self.output, "{}", product.type_name.to_uppercase().yellow().bold())?;
                current = Some(product.type_name.as_str());
            }
            writeln!(
                self.output,
                "  [{}] {}{} {}",
                product.id,
                product.name,
                product.dietary_label().green(),
                product.price()
            )?;
        }
        Ok(())
    }

    fn print_confirmation(&mut self, confirmation: &OrderConfirmation) -> io::Result<()> {
        let breakdown = &confirmation.breakdown;

        self.header(&format!("Order #{}", confirmation.order.id))?;
        writeln!(self.output, "Customer: {}", confirmation.customer_name)?;
        for line in &confirmation.lines {
            writeln!(
                self.output,
                "  {} x {} @ {} = {}",
                line.quantity,
                line.name,
                line.unit_price,
                line.line_total()
            )?;
        }
        writeln!(self.output, "Subtotal: {}", breakdown.base_total)?;
        for discount in &breakdown.discounts {
            writeln!(self.output, "  {}: {}", discount.label, discount.amount.to_string().green())?;
        }
        writeln!(self.output, "{} {}", "Total:".bold(), breakdown.final_total.to_string().bold())?;
        writeln!(
            self.output,
            "Courier: {} (#{})",
            confirmation.courier.name, confirmation.courier.id
        )?;
        writeln!(self.output, "Status: {}", confirmation.order.status)
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    async fn show_menu(&mut self, db: &Database) -> CliResult<()> {
        let products = db.products().menu().await.map_err(AppError::from)?;
        self.header("Menu")?;
        if products.is_empty() {
            writeln!(self.output, "(no products)")?;
            return Ok(());
        }
        self.print_menu(&products)?;
        Ok(())
    }

    async fn place_order(&mut self, db: &Database) -> CliResult<()> {
        let customers = list_customers(db).await?;
        self.header("Customers")?;
        for customer in &customers {
            writeln!(
                self.output,
                "  [{}] {} ({} pizzas)",
                customer.id, customer.name, customer.pizza_count
            )?;
        }
        let customer_id = self.ask_number("Customer id")?;

        let products = db.products().menu().await.map_err(AppError::from)?;
        self.header("Menu")?;
        self.print_menu(&products)?;

        let mut lines = Vec::new();
        loop {
            let raw = self.ask("Product id (blank to finish)")?;
            if raw.is_empty() {
                break;
            }
            let product_id = parse_number("Product id", &raw)?;
            let quantity = self.ask_number("Quantity")?;
            lines.push(OrderLine {
                product_id,
                quantity,
            });
        }

        let code = self.ask("Discount code (blank for none)")?;
        let request = OrderRequest {
            customer_id,
            lines,
            discount_code: (!code.is_empty()).then_some(code),
        };

        let now = (self.clock)();
        let confirmation = place_order_on(db, &request, now, local_date(now)).await?;
        self.print_confirmation(&confirmation)?;
        self.ok("Order placed")?;
        Ok(())
    }

    async fn add_customer(&mut self, db: &Database) -> CliResult<()> {
        self.header("New customer")?;
        let name = self.ask("Name")?;
        let birth_date = self.ask("Birth date (YYYY-MM-DD)")?;
        let address = self.ask("Address")?;
        let phone = self.ask("Phone")?;

        let today = local_date((self.clock)());
        let customer = add_customer(db, &name, &birth_date, &address, &phone, today).await?;
        self.ok(&format!("Customer #{} added: {}", customer.id, customer.name))?;
        Ok(())
    }

    async fn show_undelivered(&mut self, db: &Database) -> CliResult<()> {
        let orders = db.orders().undelivered().await.map_err(AppError::from)?;
        self.header("Undelivered orders")?;
        if orders.is_empty() {
            writeln!(self.output, "(none)")?;
            return Ok(());
        }
        for order in &orders {
            writeln!(
                self.output,
                "  #{} {} | courier {} | {} | {} | {}",
                order.id,
                order.customer_name,
                order.courier_name,
                order.status.to_string().yellow(),
                order.created_at.format("%Y-%m-%d %H:%M"),
                order.total()
            )?;
        }
        Ok(())
    }

    async fn mark_delivered(&mut self, db: &Database) -> CliResult<()> {
        let order_id = self.ask_number("Order id")?;
        let outcome = mark_delivered(db, order_id, (self.clock)()).await?;

        self.ok(&format!(
            "Order #{} delivered, courier cooling down until {}",
            outcome.order.id,
            outcome.available_from.with_timezone(&Local).format("%H:%M")
        ))?;
        Ok(())
    }
}

fn parse_number(label: &str, raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::validation(format!("{} must be a number", label)))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::testing::{courier, customer, database, now, product};
    use chrono::NaiveDate;

    async fn session(db: &Database, script: &str) -> String {
        colored::control::set_override(false);
        let mut output = Vec::new();
        run_session(db, script.as_bytes(), &mut output, now).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_exit_and_eof() {
        let db = database().await;
        assert!(session(&db, "0\n").await.ends_with("Bye.\n"));
        assert!(session(&db, "").await.ends_with("Bye.\n"));
    }

    #[tokio::test]
    async fn test_unknown_choice_keeps_looping() {
        let db = database().await;
        let out = session(&db, "9\n0\n").await;
        assert!(out.contains("✗ [invalid input] Unknown choice: 9"));
        assert!(out.ends_with("Bye.\n"));
    }

    #[tokio::test]
    async fn test_show_menu_groups_by_category() {
        let db = database().await;
        product(&db, "Margherita", "Pizza", 800).await;
        product(&db, "Cola", "Drink", 299).await;

        let out = session(&db, "1\n0\n").await;
        let drink = out.find("DRINK").unwrap();
        let pizza = out.find("PIZZA\n").unwrap();
        assert!(drink < pizza);
        assert!(out.contains("] Cola €2.99"));
        assert!(out.contains("] Margherita €8.00"));
    }

    #[tokio::test]
    async fn test_add_customer_then_place_and_deliver() {
        let db = database().await;
        let pizza = product(&db, "Margherita", "Pizza", 800).await;
        courier(&db, "Alex", &["6211"]).await;

        let script = format!(
            "3\nSanne\n1992-07-14\nMarkt 1, 6211 CK Maastricht\n0612345678\n\
             2\n1\n{pizza}\n2\n\n\n\
             4\n\
             5\n1\n\
             4\n0\n"
        );
        let out = session(&db, &script).await;

        assert!(out.contains("✓ Customer #1 added: Sanne"));
        assert!(out.contains("2 x Margherita @ €8.00 = €16.00"));
        assert!(out.contains("Total: €16.00"));
        assert!(out.contains("Courier: Alex"));
        assert!(out.contains("#1 Sanne | courier Alex | CREATED"));
        assert!(out.contains("✓ Order #1 delivered, courier cooling down"));
        assert!(out.contains("(none)"));
    }

    #[tokio::test]
    async fn test_workflow_error_is_printed() {
        let db = database().await;
        let c = customer(&db, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(), "Markt 1", 0).await;

        let script = format!("2\n{}\n\nNOPE\n0\n", c.id);
        let out = session(&db, &script).await;
        assert!(out.contains("✗ [invalid input] Order has no items"));
        assert!(out.ends_with("Bye.\n"));
    }

    #[tokio::test]
    async fn test_non_numeric_id() {
        let db = database().await;
        let out = session(&db, "5\nabc\n0\n").await;
        assert!(out.contains("✗ [invalid input] Order id must be a number"));
    }

    #[tokio::test]
    async fn test_eof_mid_prompt_exits() {
        let db = database().await;
        let out = session(&db, "3\nSanne\n").await;
        assert!(out.ends_with("Bye.\n"));
        assert!(list_customers(&db).await.unwrap().is_empty());
    }
}
