//! Citizen service-request models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cpf::{Cpf, CpfResult};

/// A citizen service request received through the public intake form.
///
/// Holding a `CitizenRequest` implies its CPF already passed both checksum
/// equations; an invalid CPF aborts construction before anything is stored.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CitizenRequest {
    pub id: i64,
    /// Submitter's full name
    pub name: String,
    /// Canonical, checksum-verified CPF
    pub cpf: Cpf,
    /// Free-form description of the request
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Raw intake form fields, prior to validation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewCitizenRequest {
    pub name: String,
    /// CPF as typed, punctuation allowed
    pub cpf: String,
    pub description: String,
}

impl NewCitizenRequest {
    /// Validate the CPF field, returning its canonical form.
    ///
    /// Called at the boundary where the request record is built; a
    /// rejection here aborts persistence of the whole record.
    pub fn validate_cpf(&self) -> CpfResult<Cpf> {
        Cpf::parse(&self.cpf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpf::CpfError;

    #[test]
    fn valid_form_input_yields_canonical_cpf() {
        let form = NewCitizenRequest {
            name: "Maria Souza".to_string(),
            cpf: "111.444.777-35".to_string(),
            description: "Streetlight out on Rua das Flores".to_string(),
        };
        assert_eq!(form.validate_cpf().unwrap().as_str(), "11144477735");
    }

    #[test]
    fn invalid_cpf_aborts_before_construction() {
        let form = NewCitizenRequest {
            name: "Maria Souza".to_string(),
            cpf: "123.456.789-00".to_string(),
            description: "Pothole".to_string(),
        };
        assert_eq!(form.validate_cpf(), Err(CpfError::InvalidChecksum2));
    }
}
