use serde::{Serialize, Serializer};

/// Plain acknowledgement returned by update and delete endpoints.
#[derive(Serialize, utoipa::ToSchema)]
pub struct OkResponse {
    #[schema(example = true)]
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Largest magnitude below which every integer is exactly representable in `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Serialize whole numbers as JSON integers (`1199`, not `1199.0`).
pub fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
