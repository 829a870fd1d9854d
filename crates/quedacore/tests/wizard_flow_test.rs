//! End-to-end publication flow: login, walk the eleven steps, confirm,
//! and check what actually reached the backend.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use quedacore::wizard::{ConfirmOutcome, StartOutcome, StepOutcome};
use quedacore::{Gateway, SessionRegistry, WizardStore};

const CHAT_ORGANIZADORA: i64 = 1000;

fn montar() -> (Arc<quedacore::gateway::file::FileGateway>, SessionRegistry, WizardStore) {
    let plataforma = common::plataforma();
    let registro = SessionRegistry::new(common::como_gateway(&plataforma));
    let tienda = WizardStore::new(common::como_gateway(&plataforma), "EUR");
    (plataforma, registro, tienda)
}

#[tokio::test]
async fn organizer_publishes_a_virtual_free_event() {
    let (plataforma, registro, tienda) = montar();
    let sesion = registro
        .login(CHAT_ORGANIZADORA, "carla", common::CONTRASENA)
        .await
        .expect("carla can log in");

    let StartOutcome::Started(pregunta) = tienda.start(CHAT_ORGANIZADORA) else {
        panic!("the wizard should start");
    };
    assert!(pregunta.contains("Paso 1 de 11"));

    let respuestas = [
        "Meetup", "desc", "2099-01-01", "18:00", "2", "https://meet.example/x", "50", "0", "GRATIS", "tech", "-",
    ];
    let mut resumen = None;
    for respuesta in respuestas {
        match tienda.advance(CHAT_ORGANIZADORA, respuesta) {
            Some(StepOutcome::Prompt(_)) => {}
            Some(StepOutcome::ReadyForConfirmation(texto)) => resumen = Some(texto),
            otro => panic!("{respuesta:?} was rejected: {otro:?}"),
        }
    }
    let resumen = resumen.expect("eleven answers should reach the confirmation");
    assert!(resumen.contains("Meetup"));
    assert!(resumen.contains("GRATIS"));

    match tienda.confirm(CHAT_ORGANIZADORA, &sesion).await {
        ConfirmOutcome::Submitted(evento) => {
            assert_eq!(evento.titulo, "Meetup");
            assert_eq!(evento.organizador_id, sesion.actor_id);
        }
        otro => panic!("expected Submitted, got {otro:?}"),
    }

    // Exactly one new event, with the location and price derived from
    // the raw answers.
    let eventos = plataforma.eventos().await.expect("listing always works");
    assert_eq!(eventos.len(), 2);
    let publicado = eventos.iter().find(|e| e.titulo == "Meetup").expect("published event");
    assert!(publicado.ubicacion.es_virtual);
    assert_eq!(publicado.ubicacion.enlace_virtual.as_deref(), Some("https://meet.example/x"));
    assert_eq!(publicado.ubicacion.direccion, None);
    assert!(publicado.precio.es_gratis);
    assert_eq!(publicado.precio.cantidad, 0.0);
    assert_eq!(publicado.capacidad_maxima, 50);
    assert_eq!(publicado.fecha_inicio.to_string(), "2099-01-01 18:00:00");
    assert_eq!(publicado.etiquetas, Vec::<String>::new());

    // The wizard never survives a submission attempt.
    assert!(!tienda.is_active(CHAT_ORGANIZADORA));
}

#[tokio::test]
async fn invalid_answers_reprompt_without_losing_progress() {
    let (_, registro, tienda) = montar();
    registro
        .login(CHAT_ORGANIZADORA, "carla", common::CONTRASENA)
        .await
        .expect("carla can log in");
    tienda.start(CHAT_ORGANIZADORA);

    tienda.advance(CHAT_ORGANIZADORA, "Meetup");
    tienda.advance(CHAT_ORGANIZADORA, "desc");

    // Date step: two bad tries, then a good one.
    for malo in ["mañana", "01/01/2099"] {
        match tienda.advance(CHAT_ORGANIZADORA, malo) {
            Some(StepOutcome::Invalid(mensaje)) => assert!(mensaje.contains("AAAA-MM-DD")),
            otro => panic!("{malo:?} should be rejected, got {otro:?}"),
        }
    }
    match tienda.advance(CHAT_ORGANIZADORA, "2099-01-01") {
        Some(StepOutcome::Prompt(pregunta)) => assert!(pregunta.contains("Paso 4 de 11")),
        otro => panic!("the valid date should advance, got {otro:?}"),
    }
}

#[tokio::test]
async fn cancelling_at_the_confirmation_submits_nothing() {
    let (plataforma, registro, tienda) = montar();
    registro
        .login(CHAT_ORGANIZADORA, "carla", common::CONTRASENA)
        .await
        .expect("carla can log in");
    tienda.start(CHAT_ORGANIZADORA);
    for respuesta in [
        "Meetup", "desc", "2099-01-01", "18:00", "2", "https://meet.example/x", "50", "0", "GRATIS", "tech", "-",
    ] {
        tienda.advance(CHAT_ORGANIZADORA, respuesta);
    }
    assert!(tienda.is_active(CHAT_ORGANIZADORA));

    assert!(tienda.cancel(CHAT_ORGANIZADORA));
    assert!(!tienda.is_active(CHAT_ORGANIZADORA));
    assert_eq!(plataforma.eventos().await.expect("listing always works").len(), 1);
}

#[tokio::test]
async fn a_physical_address_splits_into_street_and_locality() {
    let (plataforma, registro, tienda) = montar();
    let sesion = registro
        .login(CHAT_ORGANIZADORA, "carla", common::CONTRASENA)
        .await
        .expect("carla can log in");
    tienda.start(CHAT_ORGANIZADORA);
    for respuesta in [
        "Paseo", "andar", "2099-03-01", "10:00", "1,5", "Calle Mayor 1, Madrid", "20", "3", "EUR 12,50", "aire libre",
        "paseo, gratis no",
    ] {
        tienda.advance(CHAT_ORGANIZADORA, respuesta);
    }
    let ConfirmOutcome::Submitted(evento) = tienda.confirm(CHAT_ORGANIZADORA, &sesion).await else {
        panic!("the submission should succeed");
    };

    let eventos = plataforma.eventos().await.expect("listing always works");
    let publicado = eventos.iter().find(|e| e.id == evento.id).expect("stored event");
    assert!(!publicado.ubicacion.es_virtual);
    assert_eq!(publicado.ubicacion.direccion.as_deref(), Some("Calle Mayor 1"));
    assert_eq!(publicado.ubicacion.localidad.as_deref(), Some("Madrid"));
    assert_eq!(publicado.duracion_horas, 1.5);
    assert!(!publicado.precio.es_gratis);
    assert_eq!(publicado.precio.moneda, "EUR");
    assert_eq!(publicado.precio.cantidad, 12.5);
    assert_eq!(publicado.capacidad_minima, 3);
    assert_eq!(publicado.etiquetas, vec!["paseo".to_string(), "gratis no".to_string()]);
}
