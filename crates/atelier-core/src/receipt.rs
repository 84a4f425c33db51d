//! # Receipt
//!
//! The structured summary handed to whatever prints or renders a receipt.
//! Built from the checkout plan alone; producing one never queries the
//! database.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::bill_id::BillId;
use crate::money::{DiscountRate, Money};
use crate::types::{PaymentMethod, SaleChannel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptLine {
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Receipt {
    #[ts(as = "String")]
    pub bill_id: BillId,
    #[ts(as = "String")]
    pub issued_at: NaiveDateTime,
    pub customer_name: String,
    pub seller_name: String,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Money,
    pub discount_rate: DiscountRate,
    pub discount: Money,
    pub final_amount: Money,
    pub payment_method: PaymentMethod,
    pub sale_channel: SaleChannel,
    pub note: Option<String>,
    /// Course credits the sale added to the customer's balance.
    pub credits_minted: usize,
}

impl Receipt {
    /// Plain-text rendering for logs and the seed binary.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Bill {}  {}\n",
            self.bill_id,
            self.issued_at.format("%Y-%m-%d %H:%M")
        ));
        out.push_str(&format!("Customer: {}\n", self.customer_name));
        out.push_str(&format!("Seller:   {}\n", self.seller_name));
        for line in &self.lines {
            out.push_str(&format!(
                "  {} x{} @ {} = {}\n",
                line.product_name, line.quantity, line.unit_price, line.line_total
            ));
        }
        out.push_str(&format!("Subtotal: {}\n", self.subtotal));
        if !self.discount.is_zero() {
            out.push_str(&format!(
                "Discount ({}%): -{}\n",
                self.discount_rate.percent(),
                self.discount
            ));
        }
        out.push_str(&format!("Total:    {}\n", self.final_amount));
        out.push_str(&format!("Paid by {} via {}\n", self.payment_method, self.sale_channel));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_to_text() {
        let receipt = Receipt {
            bill_id: "B-20260214-0001".parse().unwrap(),
            issued_at: NaiveDate::from_ymd_opt(2026, 2, 14)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            customer_name: "Chai".to_string(),
            seller_name: "Nok".to_string(),
            lines: vec![ReceiptLine {
                product_name: "Knife Skills 101".to_string(),
                quantity: 2,
                unit_price: Money::from_baht(1500),
                line_total: Money::from_baht(3000),
            }],
            subtotal: Money::from_baht(3000),
            discount_rate: DiscountRate::from_percent(10),
            discount: Money::from_baht(300),
            final_amount: Money::from_baht(2700),
            payment_method: PaymentMethod::Cash,
            sale_channel: SaleChannel::LineOa,
            note: None,
            credits_minted: 2,
        };

        let text = receipt.to_text();
        assert!(text.starts_with("Bill B-20260214-0001  2026-02-14 09:30\n"));
        assert!(text.contains("Knife Skills 101 x2 @ ฿1500.00 = ฿3000.00"));
        assert!(text.contains("Discount (10%): -฿300.00"));
        assert!(text.contains("Total:    ฿2700.00"));
    }
}
