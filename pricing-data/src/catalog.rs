//! Product catalog with the MVA and IPI rates of each item.
//!
//! The catalog doubles as the default allow-list for commercial sheets and
//! as the rate source for solver queries that leave MVA or IPI blank.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// One catalog entry. Rates are fractions (`0.5686` for 56.86%).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub name: &'static str,
    pub mva_rate: Decimal,
    pub ipi_rate: Decimal,
}

const fn product(
    name: &'static str,
    mva_rate: Decimal,
    ipi_rate: Decimal,
) -> Product {
    Product {
        name,
        mva_rate,
        ipi_rate,
    }
}

pub const CATALOG: [Product; 21] = [
    product("ÁGUA SANITÁRIA 5L", dec!(0.5686), dec!(0)),
    product("ÁGUA SANITÁRIA 2L", dec!(0.5686), dec!(0)),
    product("ÁGUA SANITÁRIA 1L", dec!(0.5686), dec!(0)),
    product("CLORO DE 5L / PRO", dec!(0.5686), dec!(0)),
    product("CLORO DE 2,5L", dec!(0.5686), dec!(0)),
    product("ALVEJANTE 1.5L", dec!(0.5686), dec!(0)),
    product("AMACIANTE 5L", dec!(0.4224), dec!(0)),
    product("AMACIANTE 2L", dec!(0.4224), dec!(0)),
    product("DESINF. 2L", dec!(0.50), dec!(0.05)),
    product("DESINF. 2L CLORADO", dec!(0.50), dec!(0.05)),
    product("DESINF. 5L", dec!(0.50), dec!(0.05)),
    product("LAVA LOUÇAS 500ML", dec!(0.3560), dec!(0.0325)),
    product("LAVA LOUÇAS 5L", dec!(0.3560), dec!(0.0325)),
    product("LAVA ROUPAS 5L", dec!(0.3208), dec!(0.0325)),
    product("LAVA ROUPAS 3L", dec!(0.3208), dec!(0.0325)),
    product("LAVA ROUPAS 1L", dec!(0.3208), dec!(0.0325)),
    product("LIMPA VIDROS SQUEEZE 500ML", dec!(0.4238), dec!(0.0325)),
    product("DESENGORDURANTE 500ML", dec!(0.4238), dec!(0.0325)),
    product("MULTI-USO 500ML", dec!(0.4238), dec!(0.0325)),
    product("REMOVEDOR 1L", dec!(0.4238), dec!(0.0325)),
    product("REMOVEDOR 500ML", dec!(0.4238), dec!(0.0325)),
];

/// Compares product names the way sheets are matched: trimmed and
/// case-insensitive.
pub fn same_product(
    a: &str,
    b: &str,
) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Looks up a product by name.
pub fn find(name: &str) -> Option<&'static Product> {
    CATALOG.iter().find(|product| same_product(product.name, name))
}

pub fn names() -> Vec<String> {
    CATALOG.iter().map(|product| product.name.to_string()).collect()
}
