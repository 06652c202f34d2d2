// src/common/format.rs

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serializer};

/// Remove a máscara de CPF/CNPJ/CEP ("12.345.678/0001-99" -> "12345678000199").
pub fn only_digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Aceita "14:00" (formato do app) ou "14:00:00".
pub fn parse_horario(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

// Helpers de serde para o campo `horario`
pub mod horario {
    use super::*;

    pub fn serialize<S: Serializer>(value: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_horario(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("horário inválido: '{}'", raw)))
    }
}

pub mod horario_opcional {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse_horario(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("horário inválido: '{}'", raw))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_cnpj_mask() {
        assert_eq!(only_digits("12.345.678/0001-99"), "12345678000199");
        assert_eq!(only_digits("123.456.789-09"), "12345678909");
        assert_eq!(only_digits(""), "");
    }

    #[test]
    fn parses_both_time_formats() {
        let expected = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
        assert_eq!(parse_horario("14:00"), Some(expected));
        assert_eq!(parse_horario("14:00:00"), Some(expected));
        assert_eq!(parse_horario("25:00"), None);
        assert_eq!(parse_horario("duas horas"), None);
    }
}
