//! Input validation for stock, production and ledger operations
//!
//! Messages are provided in English and Indonesian.

use rust_decimal::Decimal;

use crate::models::{
    CreateProductionInput, CreateTransactionInput, FinishedGoodInput, RawMaterialInput,
    UpsertFinishedGoodInput,
};

/// A rejected input field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
    pub message_id: &'static str,
}

impl FieldError {
    pub const fn new(field: &'static str, message: &'static str, message_id: &'static str) -> Self {
        Self {
            field,
            message,
            message_id,
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Largest stock quantity or material usage a record can hold
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 3);
/// Decimal places kept for quantities
pub const QUANTITY_SCALE: u32 = 3;
/// Largest cash amount a transaction can hold
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_874_919_423, 2_328_306, 0, false, 2);
/// Decimal places kept for cash amounts
pub const AMOUNT_SCALE: u32 = 2;

/// Reject magnitudes above `max` and more decimal places than `scale`
fn check_bounds(
    field: &'static str,
    value: Decimal,
    max: Decimal,
    scale: u32,
) -> Result<(), FieldError> {
    if value.abs() > max {
        return Err(FieldError::new(
            field,
            "Value exceeds the allowed maximum",
            "Nilai melebihi batas maksimum",
        ));
    }
    if value.normalize().scale() > scale {
        return Err(FieldError::new(
            field,
            "Too many decimal places",
            "Terlalu banyak angka desimal",
        ));
    }
    Ok(())
}

fn require_text(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(
            field,
            "This field is required",
            "Kolom ini wajib diisi",
        ));
    }
    Ok(())
}

// ============================================================================
// Stock Validations
// ============================================================================

/// Validate a raw material before create or full replace
pub fn validate_raw_material(input: &RawMaterialInput) -> Result<(), FieldError> {
    require_text("name", &input.name)?;
    require_text("color", &input.color)?;
    require_text("size_category", &input.size_category)?;
    if input.quantity < Decimal::ZERO {
        return Err(FieldError::new(
            "quantity",
            "Quantity cannot be negative",
            "Jumlah tidak boleh negatif",
        ));
    }
    check_bounds("quantity", input.quantity, MAX_QUANTITY, QUANTITY_SCALE)
}

/// Validate a signed stock adjustment
pub fn validate_adjustment(delta: Decimal) -> Result<(), FieldError> {
    check_bounds("delta", delta, MAX_QUANTITY, QUANTITY_SCALE)
}

/// Validate a manual finished-good replacement
pub fn validate_finished_good(input: &FinishedGoodInput) -> Result<(), FieldError> {
    require_text("name", &input.name)?;
    if input.quantity < 0 {
        return Err(FieldError::new(
            "quantity",
            "Quantity cannot be negative",
            "Jumlah tidak boleh negatif",
        ));
    }
    Ok(())
}

/// Validate an upsert; the increment must be positive
pub fn validate_upsert(input: &UpsertFinishedGoodInput) -> Result<(), FieldError> {
    require_text("name", &input.name)?;
    if input.quantity_to_add <= 0 {
        return Err(FieldError::new(
            "quantity_to_add",
            "Quantity to add must be positive",
            "Jumlah yang ditambahkan harus positif",
        ));
    }
    Ok(())
}

// ============================================================================
// Production Validations
// ============================================================================

/// Validate the shape of a production request.
///
/// Availability against the snapshot is checked separately since it maps to a
/// different error kind.
pub fn validate_production(input: &CreateProductionInput) -> Result<(), FieldError> {
    if input.material_used <= Decimal::ZERO {
        return Err(FieldError::new(
            "material_used",
            "Material used must be positive",
            "Bahan yang digunakan harus positif",
        ));
    }
    check_bounds(
        "material_used",
        input.material_used,
        MAX_QUANTITY,
        QUANTITY_SCALE,
    )?;
    if input.output_quantity <= 0 {
        return Err(FieldError::new(
            "output_quantity",
            "Output quantity must be positive",
            "Jumlah hasil produksi harus positif",
        ));
    }
    require_text("product_name", &input.product_name)?;
    Ok(())
}

/// Whether the request asks for more material than the caller's snapshot holds
pub fn exceeds_snapshot(input: &CreateProductionInput) -> bool {
    input
        .current_material_quantity
        .is_some_and(|available| input.material_used > available)
}

// ============================================================================
// Ledger Validations
// ============================================================================

/// Validate a cash transaction before it is appended
pub fn validate_transaction(input: &CreateTransactionInput) -> Result<(), FieldError> {
    require_text("description", &input.description)?;
    if input.amount <= Decimal::ZERO {
        return Err(FieldError::new(
            "amount",
            "Amount must be positive",
            "Nominal harus positif",
        ));
    }
    check_bounds("amount", input.amount, MAX_AMOUNT, AMOUNT_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductType, TransactionCategory, TransactionType, Unit};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn material(quantity: i64) -> RawMaterialInput {
        RawMaterialInput {
            name: "Voal".to_string(),
            color: "Navy".to_string(),
            size_category: "Standard".to_string(),
            unit: Unit::Meter,
            quantity: Decimal::from(quantity),
        }
    }

    fn production(used: i64, output: i32, snapshot: Option<i64>) -> CreateProductionInput {
        CreateProductionInput {
            raw_material_id: Uuid::new_v4(),
            material_used: Decimal::from(used),
            output_quantity: output,
            product_type: ProductType::Pashmina,
            product_name: "Navy Pashmina".to_string(),
            current_material_quantity: snapshot.map(Decimal::from),
        }
    }

    // ========================================================================
    // Stock Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_raw_material_valid() {
        assert!(validate_raw_material(&material(100)).is_ok());
        assert!(validate_raw_material(&material(0)).is_ok());
    }

    #[test]
    fn test_validate_raw_material_negative_quantity() {
        let err = validate_raw_material(&material(-1)).unwrap_err();
        assert_eq!(err.field, "quantity");
    }

    #[test]
    fn test_validate_raw_material_blank_fields() {
        let mut input = material(10);
        input.color = "   ".to_string();
        assert_eq!(validate_raw_material(&input).unwrap_err().field, "color");

        let mut input = material(10);
        input.size_category = String::new();
        assert_eq!(
            validate_raw_material(&input).unwrap_err().field,
            "size_category"
        );
    }

    #[test]
    fn test_validate_upsert_requires_positive_increment() {
        let input = UpsertFinishedGoodInput {
            name: "Navy Pashmina".to_string(),
            product_type: ProductType::Pashmina,
            quantity_to_add: 0,
        };
        assert_eq!(validate_upsert(&input).unwrap_err().field, "quantity_to_add");
    }

    #[test]
    fn test_validate_finished_good_allows_zero() {
        let input = FinishedGoodInput {
            name: "Plain Kerudung".to_string(),
            product_type: ProductType::Kerudung,
            quantity: 0,
        };
        assert!(validate_finished_good(&input).is_ok());
    }

    // ========================================================================
    // Production Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_production_rejects_non_positive_values() {
        assert_eq!(
            validate_production(&production(0, 5, None)).unwrap_err().field,
            "material_used"
        );
        assert_eq!(
            validate_production(&production(5, 0, None)).unwrap_err().field,
            "output_quantity"
        );
    }

    #[test]
    fn test_validate_production_requires_product_name() {
        let mut input = production(10, 5, None);
        input.product_name = " ".to_string();
        assert_eq!(validate_production(&input).unwrap_err().field, "product_name");
    }

    #[test]
    fn test_exceeds_snapshot() {
        assert!(exceeds_snapshot(&production(150, 5, Some(100))));
        assert!(!exceeds_snapshot(&production(100, 5, Some(100))));
        assert!(!exceeds_snapshot(&production(150, 5, None)));
    }

    // ========================================================================
    // Ledger Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_transaction() {
        let mut input = CreateTransactionInput {
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            description: "Fabric purchase".to_string(),
            category: TransactionCategory::Purchase,
            kind: TransactionType::Out,
            amount: Decimal::from(20000),
        };
        assert!(validate_transaction(&input).is_ok());

        input.amount = Decimal::ZERO;
        assert_eq!(validate_transaction(&input).unwrap_err().field, "amount");

        input.amount = Decimal::from(1);
        input.description = String::new();
        assert_eq!(
            validate_transaction(&input).unwrap_err().field,
            "description"
        );
    }

    #[test]
    fn test_bounds_match_column_precision() {
        assert_eq!(MAX_QUANTITY.to_string(), "99999999999.999");
        assert_eq!(MAX_AMOUNT.to_string(), "99999999999999.99");
    }

    #[test]
    fn test_quantity_precision_and_magnitude() {
        let mut input = material(10);
        input.quantity = Decimal::new(100005, 4); // 10.0005
        let err = validate_raw_material(&input).unwrap_err();
        assert_eq!(err.field, "quantity");
        assert_eq!(err.message_id, "Terlalu banyak angka desimal");

        // Trailing zeros do not count as precision
        input.quantity = Decimal::new(1050000, 5); // 10.50000
        assert!(validate_raw_material(&input).is_ok());

        input.quantity = MAX_QUANTITY;
        assert!(validate_raw_material(&input).is_ok());
        input.quantity = Decimal::MAX;
        assert_eq!(
            validate_raw_material(&input).unwrap_err().message,
            "Value exceeds the allowed maximum"
        );
    }

    #[test]
    fn test_validate_adjustment() {
        assert!(validate_adjustment(Decimal::new(-25, 1)).is_ok());
        assert!(validate_adjustment(-MAX_QUANTITY).is_ok());
        assert_eq!(validate_adjustment(Decimal::MIN).unwrap_err().field, "delta");
        assert_eq!(
            validate_adjustment(Decimal::new(1, 4)).unwrap_err().field,
            "delta"
        );
    }

    #[test]
    fn test_material_used_below_stored_precision() {
        let mut input = production(1, 5, None);
        input.material_used = Decimal::new(4, 4); // 0.0004
        assert_eq!(validate_production(&input).unwrap_err().field, "material_used");
    }

    #[test]
    fn test_amount_precision_and_magnitude() {
        let mut input = CreateTransactionInput {
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            description: "Fabric purchase".to_string(),
            category: TransactionCategory::Purchase,
            kind: TransactionType::Out,
            amount: Decimal::new(1999, 2),
        };
        assert!(validate_transaction(&input).is_ok());

        input.amount = Decimal::new(19999, 3);
        assert_eq!(validate_transaction(&input).unwrap_err().field, "amount");

        input.amount = Decimal::MAX;
        assert_eq!(validate_transaction(&input).unwrap_err().field, "amount");
    }

    #[test]
    fn test_enums_serialize_as_display_names() {
        assert_eq!(serde_json::to_string(&Unit::Yard).unwrap(), "\"Yard\"");
        assert_eq!(
            serde_json::to_string(&ProductType::Kerudung).unwrap(),
            "\"Kerudung\""
        );
        assert_eq!(ProductType::from_str("Pashmina"), Some(ProductType::Pashmina));
        assert_eq!(TransactionType::from_str("Sideways"), None);
    }
}
