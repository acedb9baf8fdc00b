use crate::services::pages::upload::UploadForm;
use crate::ui::{picked_file, read_file, use_app};
use leptos::*;
use leptos_router::use_navigate;

#[component]
pub fn HomePage() -> impl IntoView {
    let app = use_app();
    let form = create_rw_signal(UploadForm::new());
    let navigate = use_navigate();

    let on_pick = move |ev: web_sys::Event| {
        if let Some(file) = picked_file(&ev) {
            spawn_local(async move {
                match read_file(file).await {
                    Ok(upload) => {
                        form.try_update(|f| f.select(upload));
                    }
                    Err(e) => log::error!("{:#}", e),
                }
            });
        }
    };

    let submit = Callback::new(move |auto_process: bool| {
        let mut current = form.get_untracked();
        if !current.can_submit() {
            return;
        }
        current.auto_process = auto_process;
        form.update(|f| f.uploading = true);

        let backend = app.backend.clone();
        let toasts = app.toasts;
        let navigate = navigate.clone();
        spawn_local(async move {
            let route = current.submit(&*backend, &toasts).await;
            form.try_set(current);
            if let Some(route) = route {
                navigate(&route.path(), Default::default());
            }
        });
    });

    let disabled = move || form.with(|f| !f.can_submit());
    let uploading = move || form.with(|f| f.uploading);

    view! {
        <section class="page home">
            <h2>"Create an audiobook"</h2>
            <p>"Upload an EPUB to extract its chapters and characters."</p>
            <label class="drop-zone">
                <input type="file" accept=".epub" on:change=on_pick/>
                {move || match form.with(|f| f.file.as_ref().map(|file| (file.name.clone(), file.size_label()))) {
                    Some((name, size)) => view! {
                        <p class="file-name">{name}</p>
                        <p class="file-size">{size}</p>
                    }
                    .into_view(),
                    None => view! { <p>"Click to choose an EPUB file"</p> }.into_view(),
                }}
            </label>
            <div class="actions">
                <button class="primary" disabled=disabled on:click=move |_| submit.call(true)>
                    {move || if uploading() { "Uploading..." } else { "Upload & Process" }}
                </button>
                <button
                    title="Upload & Configure (Casting)"
                    disabled=disabled
                    on:click=move |_| submit.call(false)
                >
                    "Upload & Configure"
                </button>
            </div>
        </section>
    }
}
