//! 发票工具：按日期/单价列出客户发票、查询发票对应的客服代表（只读）

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::db::Database;
use crate::tools::descriptor::{params_schema, ParamKind, ParamSpec, ToolArgs};
use crate::tools::Tool;

const CUSTOMER_PARAMS: &[ParamSpec] = &[ParamSpec::required(
    "customer_id",
    ParamKind::Integer,
    "The verified customer id",
)];

pub struct InvoicesByDateTool {
    db: Arc<Database>,
}

impl InvoicesByDateTool {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for InvoicesByDateTool {
    fn name(&self) -> &str {
        "get_invoices_by_customer_sorted_by_date"
    }

    fn description(&self) -> &str {
        "Look up all invoices for a customer, most recent first. Returns: a JSON list of invoice rows."
    }

    fn parameters_schema(&self) -> Value {
        params_schema(CUSTOMER_PARAMS)
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args = ToolArgs::validate(CUSTOMER_PARAMS, &args)?;
        let rows = self
            .db
            .query_rows_blocking(
                "SELECT * FROM Invoice WHERE CustomerId = ?1 ORDER BY InvoiceDate DESC",
                vec![args.int("customer_id").into()],
            )
            .await
            .map_err(|e| e.to_string())?;
        serde_json::to_string(&rows).map_err(|e| e.to_string())
    }
}

pub struct InvoicesByUnitPriceTool {
    db: Arc<Database>,
}

impl InvoicesByUnitPriceTool {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for InvoicesByUnitPriceTool {
    fn name(&self) -> &str {
        "get_invoices_sorted_by_unit_price"
    }

    fn description(&self) -> &str {
        "Use this tool when the customer wants to know the details of one of their invoices based on the unit price/cost of the invoice. \
         Returns: a JSON list of invoice rows with the line UnitPrice, highest first."
    }

    fn parameters_schema(&self) -> Value {
        params_schema(CUSTOMER_PARAMS)
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args = ToolArgs::validate(CUSTOMER_PARAMS, &args)?;
        let rows = self
            .db
            .query_rows_blocking(
                "SELECT Invoice.*, InvoiceLine.UnitPrice
                 FROM Invoice
                 JOIN InvoiceLine ON Invoice.InvoiceId = InvoiceLine.InvoiceId
                 WHERE Invoice.CustomerId = ?1
                 ORDER BY InvoiceLine.UnitPrice DESC, Invoice.InvoiceId",
                vec![args.int("customer_id").into()],
            )
            .await
            .map_err(|e| e.to_string())?;
        serde_json::to_string(&rows).map_err(|e| e.to_string())
    }
}

const EMPLOYEE_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("invoice_id", ParamKind::Integer, "The invoice id"),
    ParamSpec::required("customer_id", ParamKind::Integer, "The verified customer id"),
];

pub struct EmployeeByInvoiceTool {
    db: Arc<Database>,
}

impl EmployeeByInvoiceTool {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for EmployeeByInvoiceTool {
    fn name(&self) -> &str {
        "get_employee_by_invoice_and_customer"
    }

    fn description(&self) -> &str {
        "Take an invoice id and a customer id and return the support employee associated with the invoice. \
         Returns: a JSON list with {FirstName, Title, Email}, or a message when nothing matches."
    }

    fn parameters_schema(&self) -> Value {
        params_schema(EMPLOYEE_PARAMS)
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args = ToolArgs::validate(EMPLOYEE_PARAMS, &args)?;
        let invoice_id = args.int("invoice_id");
        let customer_id = args.int("customer_id");
        let rows = self
            .db
            .query_rows_blocking(
                "SELECT Employee.FirstName, Employee.Title, Employee.Email
                 FROM Employee
                 JOIN Customer ON Customer.SupportRepId = Employee.EmployeeId
                 JOIN Invoice ON Invoice.CustomerId = Customer.CustomerId
                 WHERE Invoice.InvoiceId = ?1 AND Invoice.CustomerId = ?2",
                vec![invoice_id.into(), customer_id.into()],
            )
            .await
            .map_err(|e| e.to_string())?;
        if rows.is_empty() {
            return Ok(format!(
                "No employee found for invoice ID {invoice_id} and customer identifier {customer_id}."
            ));
        }
        serde_json::to_string(&rows).map_err(|e| e.to_string())
    }
}

/// 发票子智能体的全部工具
pub fn invoice_tools(db: &Arc<Database>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(InvoicesByDateTool::new(db.clone())),
        Arc::new(InvoicesByUnitPriceTool::new(db.clone())),
        Arc::new(EmployeeByInvoiceTool::new(db.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn db() -> Arc<Database> {
        Arc::new(Database::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_invoices_newest_first_and_string_ids_accepted() {
        let tool = InvoicesByDateTool::new(db());
        let out = tool.execute(json!({"customer_id": "60"})).await.unwrap();
        let rows: Vec<Value> = serde_json::from_str(&out).unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r["InvoiceId"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![6, 5]);
    }

    #[tokio::test]
    async fn test_unit_price_lists_one_row_per_line() {
        let tool = InvoicesByUnitPriceTool::new(db());
        let out = tool.execute(json!({"customer_id": 1})).await.unwrap();
        let rows: Vec<Value> = serde_json::from_str(&out).unwrap();
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|r| r["UnitPrice"].as_f64() == Some(0.99)));
    }

    #[tokio::test]
    async fn test_employee_lookup_requires_matching_customer() {
        let tool = EmployeeByInvoiceTool::new(db());
        let out = tool
            .execute(json!({"invoice_id": 5, "customer_id": 60}))
            .await
            .unwrap();
        assert!(out.contains("jane@chinookcorp.com"));
        let out = tool
            .execute(json!({"invoice_id": 5, "customer_id": 1}))
            .await
            .unwrap();
        assert_eq!(out, "No employee found for invoice ID 5 and customer identifier 1.");
    }
}
