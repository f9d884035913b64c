//! Ready-made formula definitions
//!
//! These are the definitions new products start from before an operator
//! edits them. Each one reads the standard context names (`Amount`,
//! `SellPrice`, `TaxRate`, `Product.Gram`).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockFormula {
    pub name: &'static str,
    pub description: &'static str,
    pub definition: &'static str,
}

/// 22-karat sale: weight derived from the amount after a 1% margin
pub const GOLD_22K_SALE: StockFormula = StockFormula {
    name: "gold-22k-sale",
    description: "22 karat (0.916) sale, weight derived from the amount",
    definition: r#"{
  "vars": { "purity": 0.916, "netRatio": 0.99 },
  "steps": [
    { "op": "calc", "var": "unitPrice", "expr": "round(SellPrice * purity, 2)" },
    { "op": "calc", "var": "amountN", "expr": "round(Amount, 2)" },
    { "op": "calc", "var": "netPrice", "expr": "round(amountN * netRatio)" },
    { "op": "calc", "var": "gram", "expr": "round(netPrice / unitPrice)" },
    { "op": "calc", "var": "goldService", "expr": "round(gram * unitPrice, 2)" },
    { "op": "calc", "var": "laborGross", "expr": "round(amountN - goldService, 2)" },
    { "op": "calc", "var": "laborNet", "expr": "round(laborGross / (1 + TaxRate))" },
    { "op": "calc", "var": "vat", "expr": "round(laborGross - laborNet, 2)" }
  ],
  "output": {
    "gram": "gram",
    "amount": "amountN",
    "goldService": "goldService",
    "laborGross": "laborGross",
    "laborNet": "laborNet",
    "vat": "vat",
    "unitHasPriceUsed": "unitPrice"
  }
}"#,
};

/// 18-karat sale, same shape as the 22-karat formula
pub const GOLD_18K_SALE: StockFormula = StockFormula {
    name: "gold-18k-sale",
    description: "18 karat (0.750) sale, weight derived from the amount",
    definition: r#"{
  "vars": { "purity": 0.750, "netRatio": 0.99 },
  "steps": [
    { "op": "calc", "var": "unitPrice", "expr": "round(SellPrice * purity, 2)" },
    { "op": "calc", "var": "amountN", "expr": "round(Amount, 2)" },
    { "op": "calc", "var": "netPrice", "expr": "round(amountN * netRatio)" },
    { "op": "calc", "var": "gram", "expr": "unitPrice == 0 ? 0 : round(netPrice / unitPrice)" },
    { "op": "calc", "var": "goldService", "expr": "round(gram * unitPrice, 2)" },
    { "op": "calc", "var": "laborGross", "expr": "max(round(amountN - goldService, 2), 0)" },
    { "op": "calc", "var": "laborNet", "expr": "round(laborGross / (1 + TaxRate))" },
    { "op": "calc", "var": "vat", "expr": "round(laborGross - laborNet, 2)" }
  ],
  "output": {
    "gram": "gram",
    "amount": "amountN",
    "goldService": "goldService",
    "laborGross": "laborGross",
    "laborNet": "laborNet",
    "vat": "vat",
    "unitHasPriceUsed": "unitPrice"
  }
}"#,
};

/// 24-karat purchase from a customer: no labor fee, so no tax
pub const GOLD_24K_PURCHASE: StockFormula = StockFormula {
    name: "gold-24k-purchase",
    description: "24 karat (0.995) purchase, no labor fee",
    definition: r#"{
  "vars": { "purity": 0.995 },
  "steps": [
    { "op": "calc", "var": "unitPrice", "expr": "round(SellPrice * purity, 2)" },
    { "op": "calc", "var": "gram", "expr": "unitPrice == 0 ? 0 : round(Amount / unitPrice)" },
    { "op": "calc", "var": "goldService", "expr": "round(gram * unitPrice, 2)" },
    { "op": "set", "var": "laborGross", "value": 0 }
  ],
  "output": {
    "gram": "gram",
    "amount": "goldService",
    "goldService": "goldService",
    "laborGross": "laborGross",
    "unitHasPriceUsed": "unitPrice"
  }
}"#,
};

/// Product with a fixed weight: the labor fee is whatever the amount leaves over
pub const FIXED_WEIGHT_PRODUCT: StockFormula = StockFormula {
    name: "fixed-weight",
    description: "22 karat product with a fixed weight (Product.Gram)",
    definition: r#"{
  "vars": { "purity": 0.916 },
  "steps": [
    { "op": "calc", "var": "gram", "expr": "Product.Gram" },
    { "op": "calc", "var": "unitPrice", "expr": "round(SellPrice * purity, 2)" },
    { "op": "calc", "var": "goldService", "expr": "round(gram * unitPrice, 2)" },
    { "op": "calc", "var": "laborGross", "expr": "Amount > goldService ? round(Amount - goldService, 2) : 0" },
    { "op": "calc", "var": "laborNet", "expr": "round(laborGross / (1 + TaxRate))" },
    { "op": "calc", "var": "vat", "expr": "round(laborGross - laborNet, 2)" }
  ],
  "output": {
    "gram": "gram",
    "goldService": "goldService",
    "laborGross": "laborGross",
    "laborNet": "laborNet",
    "vat": "vat",
    "unitHasPriceUsed": "unitPrice"
  }
}"#,
};

pub const ALL: [StockFormula; 4] = [
    GOLD_22K_SALE,
    GOLD_18K_SALE,
    GOLD_24K_PURCHASE,
    FIXED_WEIGHT_PRODUCT,
];

pub fn find(name: &str) -> Option<&'static StockFormula> {
    ALL.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}
