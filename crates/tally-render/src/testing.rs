use tally_core::{
    DocumentRow, DocumentTemplate, InstructionLine, InvoiceDocument, PartyBlock, PaymentBlock,
    TotalsRow,
};

fn s(value: &str) -> String {
    value.to_string()
}

pub(crate) fn document() -> InvoiceDocument {
    InvoiceDocument {
        template: DocumentTemplate::Classic,
        title: s("Invoice"),
        invoice_number: s("INV-0007"),
        status: s("Sent"),
        issue_date: s("February 14, 2024"),
        due_date: s("March 15, 2024"),
        currency: s("USD"),
        logo: None,
        signature: None,
        from: PartyBlock {
            name: s("Studio North"),
            lines: vec![s("12 Harbour Street"), s("billing@studionorth.test")],
        },
        bill_to: PartyBlock {
            name: s("Acme Corp"),
            lines: vec![s("Attn: Accounts Payable"), s("ap@acme.test")],
        },
        rows: vec![DocumentRow {
            description: s("Brand refresh"),
            quantity: s("10"),
            unit_price: s("$50.00"),
            amount: s("$500.00"),
        }],
        totals: vec![
            TotalsRow { label: s("Subtotal"), amount: s("$500.00") },
            TotalsRow { label: s("Discount (10%)"), amount: s("-$50.00") },
            TotalsRow { label: s("Tax (5%)"), amount: s("$22.50") },
            TotalsRow { label: s("Total"), amount: s("$472.50") },
        ],
        amount_due: s("$472.50"),
        notes: Some(s("Thank you for your business.")),
        terms: Some(s("Net 30")),
        payment: Some(PaymentBlock {
            label: s("Main account"),
            gateway: s("SEPA transfer"),
            lines: vec![
                InstructionLine { label: s("IBAN"), value: s("DE89 3704 0044 0532 0130 00") },
                InstructionLine { label: s("BIC"), value: s("COBADEFFXXX") },
            ],
        }),
    }
}
