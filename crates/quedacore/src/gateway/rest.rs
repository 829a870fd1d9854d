//! REST implementation of the gateway.
//!
//! Thin and stateless: one `reqwest::Client` with the configured
//! timeout, Spanish resource paths, Basic auth per call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{
    Credenciales, EstadisticasCompletas, EstadoInscripcion, Evento, EventoNuevo, Inscripcion, InscripcionNueva,
    Participante, Usuario, VinculoChat,
};
use super::{Credencial, Gateway, GatewayError};
use crate::config;

pub struct RestGateway {
    client: Client,
    base: String,
}

impl RestGateway {
    /// Builds the client from `API_BASE_URL` and `API_TIMEOUT_SECS`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(config::api::BASE_URL.as_str(), config::api::timeout())
    }

    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        // Fail fast on a malformed base URL instead of on the first call.
        Url::parse(base_url).map_err(|e| anyhow::anyhow!("API_BASE_URL inválida ({base_url}): {e}"))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn ruta(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }
}

/// Maps a response to the gateway error taxonomy and decodes the body.
async fn leer<T: DeserializeOwned>(resp: Response) -> Result<T, GatewayError> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(GatewayError::Unauthorized);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GatewayError::api(status, body));
    }
    Ok(resp.json().await?)
}

/// Same mapping for operations whose body we do not need.
async fn confirmar(resp: Response) -> Result<(), GatewayError> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(GatewayError::Unauthorized);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GatewayError::api(status, body));
    }
    Ok(())
}

#[async_trait]
impl Gateway for RestGateway {
    async fn autenticar(&self, nombre_usuario: &str, contrasena: &str) -> Result<Usuario, GatewayError> {
        let body = Credenciales {
            nombre_usuario: nombre_usuario.to_string(),
            contrasena: contrasena.to_string(),
        };
        let resp = self.client.post(self.ruta("login")).json(&body).send().await?;
        leer(resp).await
    }

    async fn vincular_chat(&self, cred: &Credencial, chat_id: i64) -> Result<(), GatewayError> {
        let body = VinculoChat {
            chat_vinculado: Some(chat_id),
        };
        let resp = self
            .client
            .put(self.ruta("user"))
            .header(AUTHORIZATION, cred.header_value())
            .json(&body)
            .send()
            .await?;
        confirmar(resp).await
    }

    async fn desvincular_chat(&self, cred: &Credencial) -> Result<(), GatewayError> {
        let body = VinculoChat { chat_vinculado: None };
        let resp = self
            .client
            .put(self.ruta("user"))
            .header(AUTHORIZATION, cred.header_value())
            .json(&body)
            .send()
            .await?;
        confirmar(resp).await
    }

    async fn eventos(&self) -> Result<Vec<Evento>, GatewayError> {
        let resp = self.client.get(self.ruta("eventos")).send().await?;
        leer(resp).await
    }

    async fn crear_evento(&self, cred: &Credencial, evento: EventoNuevo) -> Result<Evento, GatewayError> {
        let resp = self
            .client
            .post(self.ruta("eventos"))
            .header(AUTHORIZATION, cred.header_value())
            .json(&evento)
            .send()
            .await?;
        leer(resp).await
    }

    async fn inscripciones(
        &self,
        cred: &Credencial,
        actor_id: i64,
        estado: Option<EstadoInscripcion>,
    ) -> Result<Vec<Inscripcion>, GatewayError> {
        let mut req = self
            .client
            .get(self.ruta(&format!("participantes/inscripciones/{actor_id}")))
            .header(AUTHORIZATION, cred.header_value());
        if let Some(estado) = estado {
            req = req.query(&[("estado", estado.to_string())]);
        }
        let resp = req.send().await?;
        leer(resp).await
    }

    async fn crear_inscripcion(&self, cred: &Credencial, nueva: InscripcionNueva) -> Result<Inscripcion, GatewayError> {
        let resp = self
            .client
            .post(self.ruta("inscripciones"))
            .header(AUTHORIZATION, cred.header_value())
            .json(&nueva)
            .send()
            .await?;
        leer(resp).await
    }

    async fn cancelar_inscripcion(&self, cred: &Credencial, id: i64) -> Result<(), GatewayError> {
        let resp = self
            .client
            .delete(self.ruta(&format!("inscripciones/{id}")))
            .header(AUTHORIZATION, cred.header_value())
            .send()
            .await?;
        confirmar(resp).await
    }

    async fn cerrar_inscripciones(&self, cred: &Credencial, evento_id: i64) -> Result<Evento, GatewayError> {
        let resp = self
            .client
            .put(self.ruta(&format!("organizadores/eventos/{evento_id}")))
            .header(AUTHORIZATION, cred.header_value())
            .json(&serde_json::json!({ "inscripcionesAbiertas": false }))
            .send()
            .await?;
        leer(resp).await
    }

    async fn participantes(&self, cred: &Credencial, evento_id: i64) -> Result<Vec<Participante>, GatewayError> {
        let resp = self
            .client
            .get(self.ruta(&format!("eventos/{evento_id}/participantes")))
            .header(AUTHORIZATION, cred.header_value())
            .send()
            .await?;
        leer(resp).await
    }

    async fn lista_espera(&self, cred: &Credencial, evento_id: i64) -> Result<Vec<Participante>, GatewayError> {
        let resp = self
            .client
            .get(self.ruta(&format!("waitlist/{evento_id}")))
            .header(AUTHORIZATION, cred.header_value())
            .send()
            .await?;
        leer(resp).await
    }

    async fn estadisticas(&self, cred: &Credencial) -> Result<EstadisticasCompletas, GatewayError> {
        let resp = self
            .client
            .get(self.ruta("estadisticas/completas"))
            .header(AUTHORIZATION, cred.header_value())
            .send()
            .await?;
        leer(resp).await
    }
}
