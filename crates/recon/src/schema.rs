//! Destination schema required by the bulk-import system.
//!
//! Column order is part of the import contract: the output file header is
//! exactly [`DESTINATION_COLUMNS`], in this order.

pub const DESTINATION_COLUMNS: [&str; 31] = [
    "NumeroInstalacaoUsina",
    "DistribuidoraNome",
    "PromotorNome",
    "Nome",
    "Email",
    "Documento",
    "RgNumero",
    "Telefone",
    "NumeroInstalacao",
    "NumeroCliente",
    "Fornecimento",
    "ModalidadeCompensacao",
    "KwhContratado",
    "TarifaDesconto",
    "Endereco",
    "EnderecoNumero",
    "EnderecoComplemento",
    "EnderecoCidade",
    "EnderecoCep",
    "EnderecoUf",
    "EnderecoBairro",
    "DataNascimento",
    "DataAssinaturaContrato",
    "Observacao",
    "ValidacaoInfosDistribuidora",
    "DescricaoValidacaoInfosDistribuidora",
    "WhatsappNotificacao",
    "DevolucaoPisCofins",
    "DevolucaoFioB",
    "DevolucaoIcms",
    "CreditoResidual",
];

pub const NOME: &str = "Nome";
pub const DOCUMENTO: &str = "Documento";
pub const NUMERO_CLIENTE: &str = "NumeroCliente";
pub const KWH_CONTRATADO: &str = "KwhContratado";
pub const DATA_NASCIMENTO: &str = "DataNascimento";
pub const DATA_ASSINATURA_CONTRATO: &str = "DataAssinaturaContrato";
pub const VALIDACAO_INFOS_DISTRIBUIDORA: &str = "ValidacaoInfosDistribuidora";
pub const WHATSAPP_NOTIFICACAO: &str = "WhatsappNotificacao";
pub const DEVOLUCAO_PIS_COFINS: &str = "DevolucaoPisCofins";
pub const DEVOLUCAO_FIO_B: &str = "DevolucaoFioB";
pub const DEVOLUCAO_ICMS: &str = "DevolucaoIcms";
pub const CREDITO_RESIDUAL: &str = "CreditoResidual";

/// Fields reformatted as ISO dates.
pub const DATE_FIELDS: [&str; 2] = [DATA_NASCIMENTO, DATA_ASSINATURA_CONTRATO];

/// Fields normalized from "Sim"/"Não" to booleans.
pub const BOOLEAN_FIELDS: [&str; 5] = [
    WHATSAPP_NOTIFICACAO,
    DEVOLUCAO_PIS_COFINS,
    DEVOLUCAO_FIO_B,
    DEVOLUCAO_ICMS,
    CREDITO_RESIDUAL,
];

/// Fields the engine fills itself; mapping tables may not target them.
pub const DERIVED_FIELDS: [&str; 2] = [NUMERO_CLIENTE, DEVOLUCAO_ICMS];

/// Position of a destination field in the output header.
pub fn field_index(name: &str) -> Option<usize> {
    DESTINATION_COLUMNS.iter().position(|c| *c == name)
}

pub fn is_destination(name: &str) -> bool {
    field_index(name).is_some()
}
