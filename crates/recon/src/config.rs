use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::schema;

pub const DEFAULT_GENERATOR_KEY: &str = "Número da Instalação";
pub const DEFAULT_DEAL_KEY: &str = "UC";

/// Destination field ← generator (A) column. Suffixed names refer to
/// columns that also exist in the deal export.
pub const DEFAULT_GENERATOR_COLUMNS: [(&str, &str); 26] = [
    ("NumeroInstalacaoUsina", "Número de Instalação do Gerador"),
    ("DistribuidoraNome", "Distribuidora_A"),
    ("PromotorNome", "Parceiro"),
    ("Nome", "Titular"),
    ("Email", "E-mails do Consumidor Final"),
    ("Documento", "Documento do Consumidor Final (CPF ou CNPJ da Matriz)"),
    ("Telefone", "Telefones do Consumidor Final"),
    ("NumeroInstalacao", "Número da Instalação"),
    ("ModalidadeCompensacao", "Modalidade de Compensação"),
    ("KwhContratado", "kWh Contratado"),
    ("TarifaDesconto", "Desconto na Tarifa(%)"),
    ("Endereco", "Endereço_A"),
    ("EnderecoNumero", "Número (Endereço)"),
    ("EnderecoComplemento", "Complemento_A"),
    ("EnderecoCidade", "Cidade_A"),
    ("EnderecoCep", "CEP_A"),
    ("EnderecoUf", "UF"),
    ("EnderecoBairro", "Bairro_A"),
    ("DataNascimento", "Data de Nascimento_A"),
    ("DataAssinaturaContrato", "Data de Assinatura"),
    ("Observacao", "Observações da Instalação"),
    (
        "ValidacaoInfosDistribuidora",
        "Status da Validação das Credenciais da Distribuidora",
    ),
    (
        "DescricaoValidacaoInfosDistribuidora",
        "Informação da Validação das Credenciais da Distribuidora",
    ),
    ("WhatsappNotificacao", "Envio de fatura via Whatsapp habilitado?"),
    ("DevolucaoPisCofins", "Restituir Impostos"),
    ("DevolucaoFioB", "Restituir Fio B"),
];

/// Destination field ← deal (B) column.
pub const DEFAULT_DEAL_COLUMNS: [(&str, &str); 2] = [
    ("RgNumero", "NÚMERO DO RG"),
    ("Fornecimento", "TIPO DE LIGAÇÃO"),
];

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "SourceConfig::default_generators")]
    pub generators: SourceConfig,
    #[serde(default = "SourceConfig::default_deals")]
    pub deals: SourceConfig,
    #[serde(default)]
    pub options: RunOptions,
}

fn default_name() -> String {
    "Ecotech bulk import".into()
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            generators: SourceConfig::default_generators(),
            deals: SourceConfig::default_deals(),
            options: RunOptions::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Key column plus destination ← source column mapping for one export.
///
/// A section present in the TOML replaces the built-in one entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub key: String,
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
}

impl SourceConfig {
    fn from_pairs(key: &str, pairs: &[(&str, &str)]) -> Self {
        Self {
            key: key.into(),
            columns: pairs
                .iter()
                .map(|(dest, src)| (dest.to_string(), src.to_string()))
                .collect(),
        }
    }

    pub fn default_generators() -> Self {
        Self::from_pairs(DEFAULT_GENERATOR_KEY, &DEFAULT_GENERATOR_COLUMNS)
    }

    pub fn default_deals() -> Self {
        Self::from_pairs(DEFAULT_DEAL_KEY, &DEFAULT_DEAL_COLUMNS)
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub on_duplicate: DuplicatePolicy,
    /// Record every value a cleaning rule had to default.
    pub strict: bool,
    /// Matched rows (and output rows) included in the report.
    pub sample_size: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            on_duplicate: DuplicatePolicy::FirstMatch,
            strict: false,
            sample_size: 5,
        }
    }
}

/// What to do when a generator key occurs more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// First generator row in file order wins; duplicates become warnings.
    #[default]
    FirstMatch,
    /// Abort the run.
    Error,
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstMatch => write!(f, "first_match"),
            Self::Error => write!(f, "error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigSerialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (section, source) in [("generators", &self.generators), ("deals", &self.deals)] {
            if source.key.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "[{section}] key column must not be empty"
                )));
            }

            for (dest, column) in &source.columns {
                if !schema::is_destination(dest) {
                    return Err(ReconError::ConfigValidation(format!(
                        "[{section}.columns] '{dest}' is not a destination field"
                    )));
                }
                if schema::DERIVED_FIELDS.contains(&dest.as_str()) {
                    return Err(ReconError::ConfigValidation(format!(
                        "[{section}.columns] '{dest}' is derived and cannot be mapped"
                    )));
                }
                if column.trim().is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "[{section}.columns] '{dest}' maps to an empty column name"
                    )));
                }
            }
        }

        if let Some(dest) = self
            .generators
            .columns
            .keys()
            .find(|dest| self.deals.columns.contains_key(*dest))
        {
            return Err(ReconError::ConfigValidation(format!(
                "'{dest}' is mapped in both [generators.columns] and [deals.columns]"
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
