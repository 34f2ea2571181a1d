//! Prompts for LLM-based receipt field extraction.
//!
//! Every prompt lives here so unit tests can inspect them without a model
//! and so wording changes touch exactly one place. Callers can override the
//! system message via [`crate::config::IndexConfig::system_prompt`].

/// Default system message.
pub const SYSTEM_PROMPT: &str = "You extract receipt information.";

/// Keys the model is asked to return.
pub const RECEIPT_KEYS: [&str; 4] = [
    "total_amount",
    "currency",
    "transaction_date",
    "descriptive_details",
];

const INSTRUCTIONS: &str = r#"You are an assistant that extracts specific information from receipt text.

Extract the following details from the receipt text below:
1. Total Amount: The final total amount paid.
2. Currency: The currency of the receipt.
3. Descriptive Details: Include merchant name and the purpose of the transaction.
4. Transaction Date: The date of the receipt.

Provide the output in the following JSON format:
{
  "total_amount": "amount (in currency. Note the different use of commas and decimals in european countries, e.g., 1,00 in Germany is 1.00 in the UK. Convert to the UK format)",
  "currency": "currency 3 letter code",
  "transaction_date": "date",
  "descriptive_details": "details"
}

If any field is not found, set its value to null or 'N/A'.

Receipt Text:
"#;

/// Build the user message for one receipt.
pub fn receipt_prompt(text: &str) -> String {
    format!("{INSTRUCTIONS}{text}\n")
}
