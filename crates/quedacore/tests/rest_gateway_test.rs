//! Wire-level checks for the REST gateway against a mock backend: paths,
//! camelCase bodies, the Basic credential header, and the error mapping.

use std::time::Duration;

use pretty_assertions::assert_eq;
use quedacore::gateway::rest::RestGateway;
use quedacore::gateway::types::EstadoInscripcion;
use quedacore::{Credencial, Gateway, GatewayError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASIC_ANA: &str = "Basic YW5hOmNsYXZl";

fn gateway(server: &MockServer) -> RestGateway {
    RestGateway::new(&server.uri(), Duration::from_secs(5)).expect("the mock server uri is valid")
}

fn usuario_json() -> serde_json::Value {
    json!({
        "id": 1,
        "nombreUsuario": "ana",
        "nombre": "Ana García",
        "rol": "USUARIO",
        "actorId": 101,
        "chatVinculado": null
    })
}

#[tokio::test]
async fn autenticar_posts_camel_case_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "nombreUsuario": "ana", "contrasena": "clave" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(usuario_json()))
        .expect(1)
        .mount(&server)
        .await;

    let usuario = gateway(&server).autenticar("ana", "clave").await.expect("login succeeds");
    assert_eq!(usuario.nombre_usuario, "ana");
    assert_eq!(usuario.actor_id, 101);
    assert_eq!(usuario.chat_vinculado, None);
}

#[tokio::test]
async fn a_401_reads_as_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let error = gateway(&server)
        .autenticar("ana", "mala")
        .await
        .expect_err("bad credentials");
    assert!(matches!(error, GatewayError::Unauthorized));
}

#[tokio::test]
async fn other_failures_keep_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/eventos"))
        .respond_with(ResponseTemplate::new(503).set_body_string("mantenimiento"))
        .mount(&server)
        .await;

    let error = gateway(&server).eventos().await.expect_err("the backend is down");
    match error {
        GatewayError::Api { status, body } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "mantenimiento");
        }
        otro => panic!("expected Api, got {otro:?}"),
    }
}

#[tokio::test]
async fn authenticated_calls_send_the_basic_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/estadisticas/completas"))
        .and(header("Authorization", BASIC_ANA))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "totalEventos": 7 })))
        .expect(1)
        .mount(&server)
        .await;

    let cred = Credencial::new("ana", "clave");
    let estadisticas = gateway(&server).estadisticas(&cred).await.expect("stats come back");
    assert_eq!(estadisticas.total_eventos, 7);
    // Absent counters default to zero instead of failing the decode.
    assert_eq!(estadisticas.total_usuarios, 0);
}

#[tokio::test]
async fn inscripciones_filter_travels_as_query_param() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/participantes/inscripciones/101"))
        .and(query_param("estado", "en_espera"))
        .and(header("Authorization", BASIC_ANA))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 5, "eventoId": 1, "participanteId": 101, "estado": "en_espera" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let cred = Credencial::new("ana", "clave");
    let lista = gateway(&server)
        .inscripciones(&cred, 101, Some(EstadoInscripcion::EnEspera))
        .await
        .expect("filtered listing");
    assert_eq!(lista.len(), 1);
    assert_eq!(lista[0].estado, EstadoInscripcion::EnEspera);
}

#[tokio::test]
async fn cerrar_inscripciones_puts_the_closing_flag() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/organizadores/eventos/3"))
        .and(body_json(json!({ "inscripcionesAbiertas": false })))
        .and(header("Authorization", BASIC_ANA))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "titulo": "Meetup",
            "descripcion": "d",
            "fechaInicio": "2099-01-01T18:00:00",
            "duracionHoras": 2.0,
            "ubicacion": { "esVirtual": true, "enlaceVirtual": "https://meet.example/x" },
            "capacidadMaxima": 50,
            "capacidadMinima": 0,
            "precio": { "esGratis": true, "moneda": "EUR", "cantidad": 0.0 },
            "categoria": "tech",
            "organizadorId": 201,
            "inscripcionesAbiertas": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cred = Credencial::new("ana", "clave");
    let evento = gateway(&server)
        .cerrar_inscripciones(&cred, 3)
        .await
        .expect("the window closes");
    assert!(!evento.inscripciones_abiertas);
    assert_eq!(evento.etiquetas, Vec::<String>::new());
}

#[tokio::test]
async fn crear_evento_serializes_the_full_payload() {
    let server = MockServer::start().await;
    let esperado = json!({
        "titulo": "Meetup",
        "descripcion": "desc",
        "fechaInicio": "2099-01-01T18:00:00",
        "duracionHoras": 2.0,
        "ubicacion": { "esVirtual": true, "enlaceVirtual": "https://meet.example/x" },
        "capacidadMaxima": 50,
        "capacidadMinima": 0,
        "precio": { "esGratis": true, "moneda": "EUR", "cantidad": 0.0 },
        "categoria": "tech",
        "etiquetas": [],
        "organizadorId": 201
    });
    let mut devuelto = esperado.clone();
    devuelto["id"] = json!(9);
    Mock::given(method("POST"))
        .and(path("/eventos"))
        .and(body_json(esperado))
        .respond_with(ResponseTemplate::new(201).set_body_json(devuelto))
        .expect(1)
        .mount(&server)
        .await;

    let cred = Credencial::new("ana", "clave");
    let nuevo = quedacore::gateway::types::EventoNuevo {
        titulo: "Meetup".to_string(),
        descripcion: "desc".to_string(),
        fecha_inicio: chrono::NaiveDate::from_ymd_opt(2099, 1, 1)
            .and_then(|d| d.and_hms_opt(18, 0, 0))
            .expect("valid date"),
        duracion_horas: 2.0,
        ubicacion: quedacore::gateway::types::Ubicacion {
            es_virtual: true,
            enlace_virtual: Some("https://meet.example/x".to_string()),
            direccion: None,
            localidad: None,
        },
        capacidad_maxima: 50,
        capacidad_minima: 0,
        precio: quedacore::gateway::types::Precio {
            es_gratis: true,
            moneda: "EUR".to_string(),
            cantidad: 0.0,
        },
        categoria: "tech".to_string(),
        etiquetas: vec![],
        organizador_id: 201,
    };
    let evento = gateway(&server).crear_evento(&cred, nuevo).await.expect("created");
    assert_eq!(evento.id, 9);
}
